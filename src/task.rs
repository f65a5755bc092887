//! Runs a single task's action: a blocking sequence of external commands
//! and file copies, one process at a time.

use crate::fs::{FileSystem, MTime};
use crate::graph::{Step, Task};
use crate::signal;
use anyhow::anyhow;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;

#[derive(Debug, PartialEq)]
pub enum Termination {
    Success,
    Interrupted,
    Failure,
}

/// The result of executing a task's steps.
pub struct TaskResult {
    pub termination: Termination,
    /// Exit code of the failing command, propagated as the build's own exit
    /// status.
    pub code: Option<i32>,
    /// Combined console output of all steps, surfaced verbatim.
    pub output: Vec<u8>,
}

/// Deletes a task's output paths unless disarmed.  Acquired before the steps
/// run, disarmed only on full success, so a failure or interrupt leaves no
/// partially-written target behind.
pub struct OutputGuard<'a> {
    fs: &'a dyn FileSystem,
    outs: Vec<String>,
    armed: bool,
}

impl<'a> OutputGuard<'a> {
    pub fn new(fs: &'a dyn FileSystem, outs: Vec<String>) -> Self {
        OutputGuard {
            fs,
            outs,
            armed: true,
        }
    }

    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl<'a> Drop for OutputGuard<'a> {
    fn drop(&mut self) {
        if self.armed {
            for out in &self.outs {
                // Removal failures here are unreportable; the build is
                // already failing with the step's own diagnostics.
                let _ = self.fs.remove_path(out);
            }
        }
    }
}

/// Executes one external command, appending its combined output.
fn run_command(argv: &[String], output: &mut Vec<u8>) -> anyhow::Result<(Termination, Option<i32>)> {
    let cmd = std::process::Command::new(&argv[0])
        .args(&argv[1..])
        .output()
        .map_err(|err| anyhow!("spawn {}: {}", argv[0], err))?;
    output.extend_from_slice(&cmd.stdout);
    output.extend_from_slice(&cmd.stderr);

    if cmd.status.success() {
        return Ok((Termination::Success, Some(0)));
    }
    if let Some(sig) = cmd.status.signal() {
        match sig {
            libc::SIGINT => write!(output, "interrupted").unwrap(),
            _ => write!(output, "signal {}", sig).unwrap(),
        }
        let termination = if sig == libc::SIGINT {
            Termination::Interrupted
        } else {
            Termination::Failure
        };
        return Ok((termination, Some(128 + sig)));
    }
    Ok((Termination::Failure, cmd.status.code()))
}

fn run_step(
    fs: &dyn FileSystem,
    step: &Step,
    output: &mut Vec<u8>,
) -> anyhow::Result<(Termination, Option<i32>)> {
    match step {
        Step::Clone { url, branch, dir } => {
            // Idempotent on directory existence: an existing clone is left
            // untouched.
            if fs.stat(dir)? != MTime::Missing {
                return Ok((Termination::Success, Some(0)));
            }
            let clone: Vec<String> = ["git", "clone", url.as_str(), dir.as_str()]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let result = run_command(&clone, output)?;
            if result.0 != Termination::Success {
                return Ok(result);
            }
            let checkout: Vec<String> = ["git", "-C", dir.as_str(), "checkout", branch.as_str()]
                .iter()
                .map(|s| s.to_string())
                .collect();
            run_command(&checkout, output)
        }
        Step::Run(argv) => run_command(argv, output),
        Step::Copy { src, dst } => {
            fs.copy(src, dst)
                .map_err(|err| anyhow!("copy {} to {}: {}", src, dst, err))?;
            Ok((Termination::Success, Some(0)))
        }
    }
}

/// Executes a task's steps in order, stopping at the first failure.
/// `out_paths` are the task's target paths, deleted if the task does not
/// run to completion.
pub fn run_task(fs: &dyn FileSystem, task: &Task, out_paths: &[String]) -> TaskResult {
    let guard = OutputGuard::new(fs, out_paths.to_vec());
    let mut output = Vec::new();
    for step in &task.steps {
        if signal::interrupted() {
            return TaskResult {
                termination: Termination::Interrupted,
                code: Some(128 + libc::SIGINT),
                output,
            };
        }
        let (termination, code) = match run_step(fs, step, &mut output) {
            Ok(result) => result,
            Err(err) => {
                // A failure outside the external process itself, e.g. a
                // missing tool or a copy error.
                let _ = writeln!(output, "{}", err);
                (Termination::Failure, None)
            }
        };
        if termination != Termination::Success {
            return TaskResult {
                termination,
                code,
                output,
            };
        }
    }
    guard.disarm();
    TaskResult {
        termination: Termination::Success,
        code: Some(0),
        output,
    }
}
