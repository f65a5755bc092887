//! Graph traversal: deciding which tasks are out of date and running them
//! in dependency order, one at a time.

use crate::fs::{FileSystem, MTime};
use crate::graph::{FileId, Graph, TaskId};
use crate::progress::Progress;
use crate::signal;
use crate::task::{self, Termination};
use anyhow::bail;
use std::collections::HashSet;

/// How a run ended.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// All wanted tasks finished; the count is how many executed an action.
    Success(usize),
    /// A task failed or was interrupted; exit code to propagate.
    Failed(i32),
}

pub struct Work<'a> {
    graph: &'a Graph,
    fs: &'a dyn FileSystem,
    progress: &'a mut dyn Progress,
    /// Tasks determined to be out of date.
    want: HashSet<TaskId>,
}

impl<'a> Work<'a> {
    pub fn new(graph: &'a Graph, fs: &'a dyn FileSystem, progress: &'a mut dyn Progress) -> Self {
        Work {
            graph,
            fs,
            progress,
            want: HashSet::new(),
        }
    }

    /// Mark a file as wanted, propagating into the task that produces it.
    /// Returns whether the file is dirty, i.e. its producer will run.
    pub fn want_file(&mut self, id: FileId) -> anyhow::Result<bool> {
        let graph = self.graph;
        match graph.file(id).input {
            Some(task) => self.want_task(task, false),
            None => {
                // Source file: it must exist, since nothing builds it.
                if self.fs.stat(&graph.file(id).name)? == MTime::Missing {
                    bail!("input {} missing", graph.file(id).name);
                }
                Ok(false)
            }
        }
    }

    /// Schedule a task to run regardless of staleness.  Its prerequisites
    /// still rebuild only when out of date.
    pub fn force_task(&mut self, id: TaskId) -> anyhow::Result<()> {
        self.want_task(id, true)?;
        Ok(())
    }

    fn want_task(&mut self, id: TaskId, force: bool) -> anyhow::Result<bool> {
        if self.want.contains(&id) {
            return Ok(true);
        }

        // Visit inputs first, to discover if any are out of date.
        let graph = self.graph;
        let task = graph.task(id);
        let mut input_dirty = false;
        for &fid in task.dirtying_ins() {
            let dirty = self.want_file(fid)?;
            input_dirty = input_dirty || dirty;
        }
        // Order-only inputs must be present before running but do not make
        // the outputs stale.
        for &fid in &task.order_only_ins {
            self.want_file(fid)?;
        }

        let dirty = force || input_dirty || self.stale(id)?;
        if dirty {
            self.want.insert(id);
        }
        Ok(dirty)
    }

    /// Whether a task's outputs are out of date relative to its inputs.
    /// Tasks with no outputs never self-report stale; they run only when
    /// forced or when an input is dirty.
    fn stale(&self, id: TaskId) -> anyhow::Result<bool> {
        let graph = self.graph;
        let task = graph.task(id);
        if task.outs.is_empty() {
            return Ok(false);
        }
        let mut oldest_out = u32::MAX;
        for &out in &task.outs {
            match self.fs.stat(&graph.file(out).name)? {
                MTime::Missing => return Ok(true),
                MTime::Stamp(mtime) => oldest_out = oldest_out.min(mtime),
            }
        }
        for &inp in task.dirtying_ins() {
            match self.fs.stat(&graph.file(inp).name)? {
                MTime::Missing => return Ok(true),
                MTime::Stamp(mtime) => {
                    if mtime > oldest_out {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// A wanted task is ready once no wanted producer of its inputs remains
    /// unfinished.
    fn ready(&self, id: TaskId, done: &HashSet<TaskId>) -> bool {
        let graph = self.graph;
        graph
            .task(id)
            .depend_ins()
            .all(|fid| match graph.file(fid).input {
                Some(producer) => !self.want.contains(&producer) || done.contains(&producer),
                None => true,
            })
    }

    /// Run all wanted tasks in dependency order, one at a time, stopping at
    /// the first failure.
    pub fn run(&mut self) -> anyhow::Result<Outcome> {
        let graph = self.graph;
        let mut pending: Vec<TaskId> = self.want.iter().copied().collect();
        pending.sort();
        let mut done: HashSet<TaskId> = HashSet::new();
        let mut ran = 0;
        while !pending.is_empty() {
            if signal::interrupted() {
                self.progress.log("interrupted");
                return Ok(Outcome::Failed(128 + libc::SIGINT));
            }
            let pos = match pending.iter().position(|&id| self.ready(id, &done)) {
                Some(pos) => pos,
                None => bail!("dependency cycle in build graph"),
            };
            let id = pending.remove(pos);
            let task = graph.task(id);
            if task.steps.is_empty() {
                // Alias node: nothing to execute.
                done.insert(id);
                continue;
            }
            self.progress.task_started(task);
            let outs: Vec<String> = task
                .outs
                .iter()
                .map(|&out| graph.file(out).name.clone())
                .collect();
            let result = task::run_task(self.fs, task, &outs);
            self.progress.task_finished(task, &result);
            match result.termination {
                Termination::Success => {}
                Termination::Interrupted => {
                    return Ok(Outcome::Failed(result.code.unwrap_or(128 + libc::SIGINT)))
                }
                Termination::Failure => return Ok(Outcome::Failed(result.code.unwrap_or(1))),
            }
            ran += 1;
            done.insert(id);
        }
        Ok(Outcome::Success(ran))
    }
}
