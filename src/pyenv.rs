//! The Python package environment that editable installs mutate.
//!
//! Installs are a process-wide side effect of the interpreter they run
//! against, so the environment is an explicit value passed into the recipe
//! rather than ambient state: pointing it at a virtualenv's interpreter
//! sandboxes the whole build.

/// Handle to a Python environment, identified by its interpreter.
pub struct PythonEnv {
    python: String,
}

impl PythonEnv {
    pub fn new(python: impl Into<String>) -> Self {
        PythonEnv {
            python: python.into(),
        }
    }

    /// `pip install --editable <dir>[extras] [--upgrade]`, run as a module
    /// of this environment's interpreter.
    pub fn pip_install_editable(&self, dir: &str, extras: &[&str], upgrade: bool) -> Vec<String> {
        let mut target = format!("./{}", dir);
        if !extras.is_empty() {
            target.push('[');
            target.push_str(&extras.join(","));
            target.push(']');
        }
        let mut argv = vec![
            self.python.clone(),
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "--editable".to_string(),
            target,
        ];
        if upgrade {
            argv.push("--upgrade".to_string());
        }
        argv
    }

    /// PyInstaller against a build spec file, without confirmation prompts.
    pub fn pyinstaller(&self, spec_file: &str) -> Vec<String> {
        vec![
            self.python.clone(),
            "-m".to_string(),
            "PyInstaller".to_string(),
            "--noconfirm".to_string(),
            spec_file.to_string(),
        ]
    }
}

impl Default for PythonEnv {
    fn default() -> Self {
        PythonEnv::new("python3")
    }
}
