//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which loads the step
//! configuration and runs MSTest once against the workspace.
//!
//! 此模块实现了 `run` 命令，它加载步骤配置并在工作区中运行一次 MSTest。

use anyhow::{Context, Result, anyhow};
use colored::*;
use std::{env, fs, path::PathBuf, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::StepFile,
        execution::perform,
        installation::{ExecutionNode, ToolRegistry},
        models::{ExecutionContext, VarMap},
    },
    infra::{log::ConsoleSink, t},
};

/// Options collected from the command line for `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub workspace: PathBuf,
    pub node: Option<String>,
    /// Raw `NAME=VALUE` build variable definitions / 原始的 `NAME=VALUE` 构建变量定义
    pub defines: Vec<String>,
    pub continue_on_fail: bool,
    /// Explicit `--lang`, which wins over the file's `language`.
    pub language: Option<String>,
}

/// Executes the run command.
///
/// # Returns
/// Whether the step passed. Configuration problems that stop the step from
/// being attempted at all are returned as errors.
pub async fn execute(options: RunOptions) -> Result<bool> {
    let step_file = StepFile::load(&options.config)?;
    if options.language.is_none() {
        if let Some(lang) = &step_file.language {
            crate::set_language(lang);
        }
    }

    let workspace = fs::canonicalize(&options.workspace).with_context(|| {
        t!("workspace_not_found", path = options.workspace.display()).to_string()
    })?;

    let node = match &options.node {
        Some(name) => step_file
            .node(name)
            .cloned()
            .ok_or_else(|| anyhow!(t!("node_not_found", name = name).to_string()))?,
        None => ExecutionNode::local(),
    };

    let mut build_variables = step_file.variables.clone();
    for define in &options.defines {
        let (name, value) = parse_define(define)?;
        build_variables.insert(name, value);
    }

    let mut step = step_file.step.clone();
    step.continue_on_fail |= options.continue_on_fail;

    let registry = ToolRegistry::with_installations(step_file.installations);

    let ctx = ExecutionContext::new(workspace, Arc::new(ConsoleSink))
        .with_env(environment_snapshot())
        .with_build_variables(build_variables)
        .with_node(node)
        .with_cancel(setup_signal_handler());

    ctx.sink
        .info(&t!("run.workspace", path = ctx.workspace.display()));

    Ok(perform(&step, &registry, &ctx).await)
}

/// Splits a `NAME=VALUE` definition. The value may be empty or contain `=`.
pub fn parse_define(define: &str) -> Result<(String, String)> {
    match define.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(anyhow!(t!("define_invalid", value = define).to_string())),
    }
}

/// The process environment, skipping entries that are not valid UTF-8.
fn environment_snapshot() -> VarMap {
    env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
