//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures shared by every stage of a step run:
//! the per-run execution context, the command invocation handed to the process
//! executor, and the error kinds a run can end with.
//!
//! 此模块定义了步骤运行各阶段共享的数据结构：
//! 每次运行的执行上下文、交给进程执行器的命令调用，以及运行可能产生的错误类型。

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::installation::ExecutionNode;
use crate::infra::log::LogSink;
use crate::infra::t;

/// A flat map of variable names to values, used for both the process
/// environment and build-scoped variables.
/// 变量名到值的映射，用于进程环境变量和构建变量。
pub type VarMap = BTreeMap<String, String>;

/// Everything a single run needs from the outside world.
/// It is built fresh for each run and never persisted.
///
/// 单次运行从外部获得的全部内容。
/// 每次运行都会重新构建，且从不持久化。
#[derive(Clone)]
pub struct ExecutionContext {
    /// Process environment snapshot / 进程环境变量快照
    pub env: VarMap,
    /// Build-scoped variables defined by the job / 由构建任务定义的构建变量
    pub build_variables: VarMap,
    /// Workspace root; the runner executes here / 工作区根目录，运行器在此执行
    pub workspace: PathBuf,
    /// The node the runner executes on / 运行器所在的执行节点
    pub node: ExecutionNode,
    /// Build log / 构建日志
    pub sink: Arc<dyn LogSink>,
    /// Cancels the run; a running process is killed / 取消运行，正在运行的进程会被终止
    pub cancel: CancellationToken,
}

impl ExecutionContext {
    /// Creates a context on the local node with no variables and a fresh cancellation token.
    pub fn new(workspace: impl Into<PathBuf>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            env: VarMap::new(),
            build_variables: VarMap::new(),
            workspace: workspace.into(),
            node: ExecutionNode::local(),
            sink,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_env(mut self, env: VarMap) -> Self {
        self.env = env;
        self
    }

    pub fn with_build_variables(mut self, build_variables: VarMap) -> Self {
        self.build_variables = build_variables;
        self
    }

    pub fn with_node(mut self, node: ExecutionNode) -> Self {
        self.node = node;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// The fully assembled command: the argument vector (executable first),
/// the environment to add, and the directory to run in.
///
/// 完整组装好的命令：参数向量（可执行文件在首位）、要添加的环境变量以及运行目录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub argv: Vec<String>,
    pub env: VarMap,
    pub working_dir: PathBuf,
}

impl CommandInvocation {
    /// The executable path, i.e. the first element of `argv`.
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Everything after the executable.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// Renders the command line for the build log, quoting arguments that need it.
    pub fn display(&self) -> String {
        shlex::try_join(self.argv.iter().map(String::as_str))
            .unwrap_or_else(|_| self.argv.join(" "))
    }
}

/// Failures of the process executor. These are distinct from a non-zero exit
/// code, which is an ordinary result handled by the outcome policy.
///
/// 进程执行器的失败。它们不同于非零退出码，后者是由结果策略处理的普通结果。
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for the process: {0}")]
    Wait(#[source] io::Error),

    #[error("process terminated without an exit code")]
    Terminated,

    #[error("run was cancelled")]
    Cancelled,
}

/// Every way a step run can stop before the outcome policy gets a say.
/// 步骤运行在结果策略介入之前可能停止的所有方式。
#[derive(Debug, Error)]
pub enum StepError {
    #[error("result file name was not specified")]
    MissingResultFile,

    #[error("no test files are specified")]
    MissingTestContainers,

    /// Not fatal: the caller falls back to the bare executable name.
    #[error("no installation named '{name}'")]
    InstallationNotFound { name: String },

    #[error("{path} doesn't exist")]
    InstallationPathMissing { path: String },

    #[error("failed checking for existence of {path}: {source}")]
    InstallationCheckFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete old result file {path}: {source}")]
    ArtifactCleanup {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl StepError {
    /// Whether the run must abort. Only a missing installation is recoverable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StepError::InstallationNotFound { .. })
    }

    /// The localized message written to the build log.
    pub fn log_message(&self) -> String {
        match self {
            StepError::MissingResultFile => t!("run.result_file_missing").to_string(),
            StepError::MissingTestContainers => t!("run.test_files_missing").to_string(),
            StepError::InstallationNotFound { name } => t!(
                "run.installation_not_found",
                name = name,
                exec = crate::core::installation::DEFAULT_EXECUTABLE
            )
            .to_string(),
            StepError::InstallationPathMissing { path } => {
                t!("run.path_missing", path = path).to_string()
            }
            StepError::InstallationCheckFailed { path, source } => {
                t!("run.path_check_failed", path = path, error = source).to_string()
            }
            StepError::ArtifactCleanup { path, source } => {
                t!("run.result_file_delete_failed", path = path, error = source).to_string()
            }
            StepError::Execution(e) => t!("run.launch_failed", error = e).to_string(),
        }
    }
}
