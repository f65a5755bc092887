//! The CellProfiler bundling recipe: the concrete task nodes, their edges,
//! and the artifacts `clean` removes.

use crate::graph::{FileId, Graph, Step, Task, TaskId};
use crate::pyenv::PythonEnv;

const CELLPROFILER_URL: &str = "https://github.com/CellProfiler/CellProfiler.git";
const CELLPROFILER_DIR: &str = "CellProfiler";
const CELLPROFILER_BRANCH: &str = "master";

const CORE_URL: &str = "https://github.com/CellProfiler/core.git";
const CORE_DIR: &str = "core";
const CORE_BRANCH: &str = "master";

const SPEC_FILE: &str = "CellProfiler.spec";
const PLIST_FILE: &str = "Info.plist";
const ENTITLEMENTS_FILE: &str = "entitlements.plist";

const BUILD_DIR: &str = "build";
const DIST_DIR: &str = "dist";
const APP_PATH: &str = "dist/CellProfiler.app";
const APP_PLIST: &str = "dist/CellProfiler.app/Contents/Info.plist";
const APP_ENTITLEMENTS: &str = "dist/CellProfiler.app/Contents/MacOS/entitlements.plist";
const DMG_FILE: &str = "CellProfiler.dmg";

/// The build graph plus the entry points the command line resolves to.
pub struct Recipe {
    pub graph: Graph,
    /// Files wanted by the default target.
    pub default: Vec<FileId>,
    /// The dependency-install node; the `dependencies` target forces it.
    pub install: TaskId,
    /// The disk-image file; the `dmg` target wants it.
    pub dmg: FileId,
}

pub fn build(env: &PythonEnv) -> Recipe {
    let mut graph = Graph::new();

    let cellprofiler_dir = graph.file_id(CELLPROFILER_DIR);
    let core_dir = graph.file_id(CORE_DIR);
    let spec_file = graph.file_id(SPEC_FILE);
    let plist_file = graph.file_id(PLIST_FILE);
    let entitlements_file = graph.file_id(ENTITLEMENTS_FILE);
    let app = graph.file_id(APP_PATH);
    let app_plist = graph.file_id(APP_PLIST);
    let app_entitlements = graph.file_id(APP_ENTITLEMENTS);
    let dmg = graph.file_id(DMG_FILE);

    graph.add_task(Task {
        desc: format!("clone {}", CELLPROFILER_DIR),
        steps: vec![Step::Clone {
            url: CELLPROFILER_URL.to_string(),
            branch: CELLPROFILER_BRANCH.to_string(),
            dir: CELLPROFILER_DIR.to_string(),
        }],
        ins: vec![],
        order_only_ins: vec![],
        outs: vec![cellprofiler_dir],
    });

    // The editable installs leave no trace in the workspace, so the core
    // checkout doubles as this node's target; timestamps inside the source
    // trees are deliberately not compared (order-only input).
    let install = graph.add_task(Task {
        desc: "install dependencies".to_string(),
        steps: vec![
            Step::Clone {
                url: CORE_URL.to_string(),
                branch: CORE_BRANCH.to_string(),
                dir: CORE_DIR.to_string(),
            },
            Step::Run(env.pip_install_editable(CORE_DIR, &["test"], false)),
            Step::Run(env.pip_install_editable(CELLPROFILER_DIR, &["build", "test"], true)),
        ],
        ins: vec![],
        order_only_ins: vec![cellprofiler_dir],
        outs: vec![core_dir],
    });

    graph.add_task(Task {
        desc: "bundle CellProfiler.app".to_string(),
        steps: vec![Step::Run(env.pyinstaller(SPEC_FILE))],
        ins: vec![cellprofiler_dir, core_dir, plist_file, spec_file],
        order_only_ins: vec![],
        outs: vec![app],
    });

    graph.add_task(Task {
        desc: "install bundle resources".to_string(),
        steps: vec![
            Step::Copy {
                src: PLIST_FILE.to_string(),
                dst: APP_PLIST.to_string(),
            },
            Step::Copy {
                src: ENTITLEMENTS_FILE.to_string(),
                dst: APP_ENTITLEMENTS.to_string(),
            },
        ],
        ins: vec![app, plist_file, entitlements_file],
        order_only_ins: vec![],
        outs: vec![app_plist, app_entitlements],
    });

    graph.add_task(Task {
        desc: "create disk image".to_string(),
        steps: vec![Step::Run(
            [
                "hdiutil",
                "create",
                "-volname",
                "CellProfiler",
                "-srcfolder",
                APP_PATH,
                "-ov",
                "-format",
                "UDZO",
                DMG_FILE,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )],
        ins: vec![app_plist, app_entitlements],
        order_only_ins: vec![],
        outs: vec![dmg],
    });

    Recipe {
        graph,
        default: vec![app_plist, app_entitlements],
        install,
        dmg,
    }
}

/// Everything the build may have written, in removal order.
pub fn clean_paths() -> &'static [&'static str] {
    &[CELLPROFILER_DIR, CORE_DIR, BUILD_DIR, DIST_DIR, DMG_FILE]
}
