//! Build progress reporting, for display to the user.

use crate::graph::Task;
use crate::task::{TaskResult, Termination};
use std::io::Write;

/// Trait for build progress notifications.
pub trait Progress {
    /// Called when a task starts.
    fn task_started(&mut self, task: &Task);

    /// Called when a task completes.
    fn task_finished(&mut self, task: &Task, result: &TaskResult);

    /// Log a line of output.
    fn log(&mut self, msg: &str);
}

/// Console reporter.  Tasks run one at a time, so plain sequential printing
/// suffices; there is no multi-task status to overprint.
pub struct ConsoleProgress {
    /// Whether to print command lines of started steps.
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        ConsoleProgress { verbose }
    }
}

impl Progress for ConsoleProgress {
    fn task_started(&mut self, task: &Task) {
        self.log(&task.desc);
        if self.verbose {
            for step in &task.steps {
                println!("  {}", step.render());
            }
        }
    }

    fn task_finished(&mut self, task: &Task, result: &TaskResult) {
        match result.termination {
            Termination::Success => {}
            Termination::Interrupted => self.log(&format!("interrupted: {}", task.desc)),
            Termination::Failure => self.log(&format!("failed: {}", task.desc)),
        }
        if !result.output.is_empty() {
            // The external tool's own diagnostics are the error report;
            // pass them through untouched.
            std::io::stdout().write_all(&result.output).unwrap();
        }
    }

    fn log(&mut self, msg: &str) {
        println!("{}", msg);
    }
}
