//! The build graph: target files, the task nodes that produce them, and the
//! edges between them.

use rustc_hash::FxHashMap;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FileId(usize);
impl FileId {
    fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct TaskId(usize);
impl TaskId {
    fn index(&self) -> usize {
        self.0
    }
}

/// A path in the graph: either a source file the user provides or the
/// target of some task.
#[derive(Debug)]
pub struct File {
    pub name: String,
    /// The task that produces this file, if any.
    pub input: Option<TaskId>,
    /// Tasks that consume this file.
    pub dependents: Vec<TaskId>,
}

/// One unit of a task's action, executed in order.
#[derive(Debug, Clone)]
pub enum Step {
    /// Clone a repository and check out a pinned branch.  Skipped entirely
    /// when the directory already exists.
    Clone {
        url: String,
        branch: String,
        dir: String,
    },
    /// Spawn an external command.
    Run(Vec<String>),
    /// Copy a file; the destination directory must already exist.
    Copy { src: String, dst: String },
}

impl Step {
    /// The command line to display for this step.
    pub fn render(&self) -> String {
        match self {
            Step::Clone { url, branch, dir } => {
                format!("git clone {} {} && git -C {} checkout {}", url, dir, dir, branch)
            }
            Step::Run(argv) => argv.join(" "),
            Step::Copy { src, dst } => format!("cp {} {}", src, dst),
        }
    }
}

#[derive(Debug)]
pub struct Task {
    /// Status line shown while the task runs.
    pub desc: String,
    pub steps: Vec<Step>,
    /// Input paths that, if changed, make the outputs stale.
    pub ins: Vec<FileId>,
    /// Inputs that must exist before the task runs but whose timestamps do
    /// not make the outputs stale.
    pub order_only_ins: Vec<FileId>,
    pub outs: Vec<FileId>,
}

impl Task {
    /// Inputs that are needed before running.
    pub fn depend_ins(&self) -> impl Iterator<Item = FileId> + '_ {
        self.ins.iter().chain(self.order_only_ins.iter()).copied()
    }

    /// Input paths that, if changed, invalidate the outputs.
    pub fn dirtying_ins(&self) -> &[FileId] {
        &self.ins
    }
}

pub struct Graph {
    files: Vec<File>,
    tasks: Vec<Task>,
    file_to_id: FxHashMap<String, FileId>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph {
            files: Vec::new(),
            tasks: Vec::new(),
            file_to_id: FxHashMap::default(),
        }
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.index()]
    }

    /// Intern a path, creating its File entry on first use.
    pub fn file_id(&mut self, name: impl Into<String>) -> FileId {
        let name = name.into();
        match self.file_to_id.get(&name) {
            Some(id) => *id,
            None => {
                let id = FileId(self.files.len());
                self.files.push(File {
                    name: name.clone(),
                    input: None,
                    dependents: Vec::new(),
                });
                self.file_to_id.insert(name, id);
                id
            }
        }
    }

    pub fn lookup_file(&self, name: &str) -> Option<FileId> {
        self.file_to_id.get(name).copied()
    }

    pub fn add_task(&mut self, task: Task) -> TaskId {
        let id = TaskId(self.tasks.len());
        for inf in task.depend_ins() {
            self.files[inf.index()].dependents.push(id);
        }
        for &out in &task.outs {
            let f = &mut self.files[out.index()];
            match f.input {
                Some(t) => panic!("double producer for {:?}: {:?}", f.name, t),
                None => f.input = Some(id),
            }
        }
        self.tasks.push(task);
        id
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }
}
