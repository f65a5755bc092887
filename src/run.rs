//! Command-line entry point.

use anyhow::anyhow;
use std::path::Path;

use crate::fs::{FileSystem, RealFileSystem};
use crate::progress::ConsoleProgress;
use crate::pyenv::PythonEnv;
use crate::recipe;
use crate::signal;
use crate::trace;
use crate::work::{Outcome, Work};

fn run_impl() -> anyhow::Result<i32> {
    let args: Vec<_> = std::env::args().collect();

    let mut opts = getopts::Options::new();
    opts.optopt("C", "", "chdir before running", "DIR");
    opts.optopt(
        "p",
        "python",
        "python interpreter of the target package environment [default=python3]",
        "PROG",
    );
    opts.optopt("d", "debug", "debugging tools", "TOOL");
    opts.optflag("h", "help", "");
    opts.optflag("v", "verbose", "print executed command lines");
    let matches = opts.parse(&args[1..])?;
    if matches.opt_present("h") {
        println!(
            "{}",
            opts.usage("usage: cpbundle [options] [target...]\ntargets: app (default), dependencies, dmg, clean")
        );
        return Ok(1);
    }

    if let Some(debug) = matches.opt_str("d") {
        match debug.as_str() {
            "list" => {
                println!("debug tools:");
                println!("  trace  generate json performance trace");
                return Ok(1);
            }
            "trace" => trace::open("trace.json")?,
            _ => anyhow::bail!("unknown -d {:?}, use -d list to list", debug),
        }
    }

    if let Some(dir) = matches.opt_str("C") {
        let dir = Path::new(&dir);
        std::env::set_current_dir(dir).map_err(|err| anyhow!("chdir {:?}: {}", dir, err))?;
    }

    let fs = RealFileSystem::new();
    let verbose = matches.opt_present("v");

    let mut targets = matches.free.clone();
    if targets.is_empty() {
        targets.push("app".to_string());
    }

    if targets.iter().any(|target| target == "clean") {
        if targets.len() > 1 {
            anyhow::bail!("clean cannot be combined with other targets");
        }
        return clean(&fs);
    }

    let env = PythonEnv::new(
        matches
            .opt_str("p")
            .unwrap_or_else(|| "python3".to_string()),
    );
    let recipe = recipe::build(&env);

    signal::register_sigint();
    let mut progress = ConsoleProgress::new(verbose);
    let mut work = Work::new(&recipe.graph, &fs, &mut progress);
    trace::scope("want", || -> anyhow::Result<()> {
        for target in &targets {
            match target.as_str() {
                "app" => {
                    for &id in &recipe.default {
                        work.want_file(id)?;
                    }
                }
                "dependencies" => work.force_task(recipe.install)?,
                "dmg" => {
                    work.want_file(recipe.dmg)?;
                }
                name => match recipe.graph.lookup_file(name) {
                    Some(id) if recipe.graph.file(id).input.is_some() => {
                        work.want_file(id)?;
                    }
                    _ => anyhow::bail!("unknown target {:?}", name),
                },
            }
        }
        Ok(())
    })?;

    match trace::scope("work.run", || work.run())? {
        Outcome::Failed(code) => {
            // Don't print any summary, the failing task is enough info.
            Ok(code)
        }
        Outcome::Success(0) => {
            println!("cpbundle: no work to do");
            Ok(0)
        }
        Outcome::Success(n) => {
            println!("cpbundle: ran {} tasks, now up to date", n);
            Ok(0)
        }
    }
}

/// Remove everything a build may have produced.  Never fails: a missing
/// artifact is already clean, and anything else is reported and skipped.
fn clean(fs: &dyn FileSystem) -> anyhow::Result<i32> {
    for path in recipe::clean_paths() {
        match fs.remove_path(path) {
            Ok(true) => println!("removed {}", path),
            Ok(false) => {}
            Err(err) => println!("cpbundle: warning: remove {}: {}", path, err),
        }
    }
    Ok(0)
}

pub fn run() -> anyhow::Result<i32> {
    let res = run_impl();
    trace::close();
    res
}
