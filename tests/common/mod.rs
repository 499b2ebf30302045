// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mstest_runner::core::installation::ToolInstallation;
use mstest_runner::core::models::{ExecutionContext, VarMap};
use mstest_runner::infra::log::MemorySink;
use tempfile::{TempDir, tempdir};

/// Builds a `VarMap` from string pairs.
pub fn vars(pairs: &[(&str, &str)]) -> VarMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A context on the local node whose log is captured in memory.
pub fn memory_context(workspace: &Path) -> (ExecutionContext, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let ctx = ExecutionContext::new(workspace, sink.clone());
    (ctx, sink)
}

pub fn workspace() -> TempDir {
    tempdir().expect("Failed to create temporary workspace")
}

/// Writes a shell script that stands in for MSTest. It records its
/// arguments one per line in `args.txt` in the working directory, prints a
/// line on each stream, and exits with `$FAKE_MSTEST_EXIT` (default 0).
pub fn write_fake_mstest(dir: &Path) -> PathBuf {
    let script = dir.join("fake_mstest.sh");
    let content = r#"
printf '%s\n' "$@" > args.txt
echo "Loading tests..."
echo "warning from mstest" >&2
exit "${FAKE_MSTEST_EXIT:-0}"
"#;
    fs::write(&script, content).expect("Failed to write fake mstest");
    script
}

/// An installation that runs the fake MSTest through `/bin/sh`, so the
/// script itself never has to be executable.
pub fn fake_installation(name: &str, script: &Path) -> ToolInstallation {
    ToolInstallation {
        name: name.to_string(),
        home: "/bin/sh".to_string(),
        default_args: Some(format!("\"{}\"", script.display())),
        omit_no_isolation: false,
    }
}

/// Arguments recorded by the fake MSTest, or `None` if it never ran.
pub fn recorded_args(workspace: &Path) -> Option<Vec<String>> {
    fs::read_to_string(workspace.join("args.txt"))
        .ok()
        .map(|content| content.lines().map(str::to_string).collect())
}
