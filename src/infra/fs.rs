//! # Result File Module / 结果文件模块
//!
//! Removes a result file left over from an earlier run, so that it cannot be
//! mistaken for the output of the current one.
//!
//! 删除先前运行遗留的结果文件，以免其被误认为是本次运行的输出。

use std::path::{Path, PathBuf};

use crate::core::models::StepError;
use crate::infra::log::LogSink;
use crate::infra::t;

/// What [`prepare_result_file`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultFileAction {
    /// Nothing was there / 文件不存在
    Absent(PathBuf),
    /// An old file was deleted / 已删除旧文件
    Deleted(PathBuf),
}

/// Deletes `workspace/result_file` if it exists.
///
/// # Arguments
/// * `workspace` - The workspace root
/// * `result_file` - Result file path relative to the workspace
/// * `sink` - Build log
///
/// # Returns
/// The action taken, or [`StepError::ArtifactCleanup`] if the file could not
/// be checked or deleted. The run must not continue in that case.
pub async fn prepare_result_file(
    workspace: &Path,
    result_file: &str,
    sink: &dyn LogSink,
) -> Result<ResultFileAction, StepError> {
    let path = workspace.join(result_file);

    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|source| cleanup_error(&path, source))?;

    if !exists {
        sink.info(&t!("run.result_file_absent", path = path.display()));
        return Ok(ResultFileAction::Absent(path));
    }

    sink.info(&t!("run.result_file_deleting", path = path.display()));
    tokio::fs::remove_file(&path)
        .await
        .map_err(|source| cleanup_error(&path, source))?;

    Ok(ResultFileAction::Deleted(path))
}

fn cleanup_error(path: &Path, source: std::io::Error) -> StepError {
    StepError::ArtifactCleanup {
        path: path.display().to_string(),
        source,
    }
}
