//! Support code for e2e tests, which run the cpbundle binary against stub
//! external tools in a temp directory.

mod basic;

use std::os::unix::fs::PermissionsExt;

pub fn cpbundle_binary() -> std::path::PathBuf {
    std::env::current_exe()
        .expect("test binary path")
        .parent()
        .expect("test binary directory")
        .parent()
        .expect("binary directory")
        .join("cpbundle")
}

pub fn cpbundle_command(args: Vec<&str>) -> std::process::Command {
    let mut cmd = std::process::Command::new(cpbundle_binary());
    cmd.args(args);
    cmd
}

fn print_output(out: &std::process::Output) {
    // Gross: use print! instead of writing to stdout so Rust test
    // framework can capture it.
    print!("{}", std::str::from_utf8(&out.stdout).unwrap());
    print!("{}", std::str::from_utf8(&out.stderr).unwrap());
}

pub fn assert_output_contains(out: &std::process::Output, text: &str) {
    let stdout = std::str::from_utf8(&out.stdout).unwrap();
    if !stdout.contains(text) {
        panic!(
            "assertion failed; expected output to contain {:?} but got:\n{}",
            text, stdout
        );
    }
}

pub fn assert_output_not_contains(out: &std::process::Output, text: &str) {
    let stdout = std::str::from_utf8(&out.stdout).unwrap();
    if stdout.contains(text) {
        panic!(
            "assertion failed; expected output to not contain {:?} but got:\n{}",
            text, stdout
        );
    }
}

/// Stub git: `clone <url> <dir>` creates the directory; `-C <dir> checkout`
/// is a no-op.
pub const GIT_STUB: &str = r#"if [ "$1" = clone ]; then
  mkdir -p "$3"
  touch "$3/.git"
fi
exit 0
"#;

/// Stub python3: pip installs succeed silently; PyInstaller materializes the
/// bundle skeleton and its build directory.
pub const PYTHON_STUB: &str = r#"if [ "$2" = pip ]; then
  exit 0
fi
if [ "$2" = PyInstaller ]; then
  mkdir -p build
  mkdir -p dist/CellProfiler.app/Contents/MacOS
  exit 0
fi
echo "unexpected python invocation: $*" >&2
exit 1
"#;

/// Stub hdiutil: records only the requested image file.
pub const HDIUTIL_STUB: &str = r#"touch CellProfiler.dmg
exit 0
"#;

/// Manages a temporary directory for invoking cpbundle.
pub struct TestSpace {
    dir: tempfile::TempDir,
}

impl TestSpace {
    pub fn new() -> anyhow::Result<Self> {
        let space = TestSpace {
            dir: tempfile::tempdir()?,
        };
        std::fs::create_dir(space.dir.path().join("bin"))?;
        Ok(space)
    }

    /// A workspace holding the three input files and the usual stub tools.
    pub fn with_inputs() -> anyhow::Result<Self> {
        let space = TestSpace::new()?;
        space.write("Info.plist", "plist-template")?;
        space.write("entitlements.plist", "entitlements")?;
        space.write("CellProfiler.spec", "spec")?;
        space.stub_tool("git", GIT_STUB)?;
        space.stub_tool("python3", PYTHON_STUB)?;
        Ok(space)
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file into the working space.
    pub fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        std::fs::write(self.path(path), content)
    }

    /// Read a file from the working space.
    pub fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.path(path).exists()
    }

    pub fn remove_dir(&self, path: &str) -> std::io::Result<()> {
        std::fs::remove_dir_all(self.path(path))
    }

    /// Install a stub executable standing in for an external tool.
    pub fn stub_tool(&self, name: &str, script: &str) -> std::io::Result<()> {
        let path = self.dir.path().join("bin").join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", script))?;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)
    }

    /// Invoke cpbundle with the stub tools first on PATH.
    pub fn run(&self, cmd: &mut std::process::Command) -> std::io::Result<std::process::Output> {
        let path = format!(
            "{}:{}",
            self.dir.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        cmd.env("PATH", path).current_dir(self.dir.path()).output()
    }

    /// Like run, but print output and fail if the build failed.
    pub fn run_expect(
        &self,
        cmd: &mut std::process::Command,
    ) -> anyhow::Result<std::process::Output> {
        let out = self.run(cmd)?;
        if !out.status.success() {
            print_output(&out);
            anyhow::bail!("build failed, status {}", out.status);
        }
        Ok(out)
    }
}
