//! # Argument Builder Module / 参数构建模块
//!
//! Assembles the MSTest command line from the resolved installation, the step
//! configuration and the run's variables.
//!
//! 根据已解析的安装、步骤配置和本次运行的变量组装 MSTest 命令行。
//!
//! ## Argument order / 参数顺序
//!
//! 1. executable (installation home or `mstest.exe`)
//! 2. installation default arguments
//! 3. `/resultsfile:<file>`
//! 4. `/noisolation`, unless the installation opts out
//! 5. extra arguments
//! 6. `/category:"<filter>"`
//! 7. one `/testcontainer:<path>` per container

use crate::core::config::StepConfig;
use crate::core::installation::{DEFAULT_EXECUTABLE, ResolvedInstallation};
use crate::core::macros;
use crate::core::models::{CommandInvocation, ExecutionContext, StepError};

pub const RESULTS_FILE_FLAG: &str = "/resultsfile:";
pub const NO_ISOLATION_FLAG: &str = "/noisolation";
pub const CATEGORY_FLAG: &str = "/category:";
pub const TEST_CONTAINER_FLAG: &str = "/testcontainer:";

/// Builds the invocation for one run.
///
/// `resolved` is `None` when no installation matched; the bare
/// [`DEFAULT_EXECUTABLE`] is used and `/noisolation` is still passed.
///
/// # Errors
/// [`StepError::MissingResultFile`] or [`StepError::MissingTestContainers`].
/// Both are raised before anything is launched.
pub fn build(
    resolved: Option<&ResolvedInstallation>,
    config: &StepConfig,
    ctx: &ExecutionContext,
) -> Result<CommandInvocation, StepError> {
    let mut argv = Vec::new();

    match resolved {
        Some(installation) => {
            argv.push(installation.home.clone());
            if let Some(default_args) = &installation.default_args {
                argv.extend(macros::tokenize(default_args));
            }
        }
        None => argv.push(DEFAULT_EXECUTABLE.to_string()),
    }

    let result_file = config.result_file()?;
    argv.push(format!("{RESULTS_FILE_FLAG}{result_file}"));

    if !resolved.is_some_and(|installation| installation.omit_no_isolation) {
        argv.push(NO_ISOLATION_FLAG.to_string());
    }

    argv.extend(extra_arguments(&config.extra_args, ctx));

    if let Some(categories) = config.categories() {
        argv.push(format!("{CATEGORY_FLAG}\"{categories}\""));
    }

    argv.extend(
        test_containers(&config.test_containers, ctx)?
            .into_iter()
            .map(|container| format!("{TEST_CONTAINER_FLAG}{container}")),
    );

    Ok(CommandInvocation {
        argv,
        env: ctx.env.clone(),
        working_dir: ctx.workspace.clone(),
    })
}

/// Normalizes, expands (environment then build variables) and tokenizes the extra arguments.
pub fn extra_arguments(extra_args: &str, ctx: &ExecutionContext) -> Vec<String> {
    let normalized = macros::normalize_line_breaks(extra_args);
    let expanded = macros::expand_all(&normalized, &[&ctx.env, &ctx.build_variables]);
    if expanded.trim().is_empty() {
        return Vec::new();
    }
    macros::tokenize(&expanded)
}

/// Expands the container block against the environment, then each line
/// against the environment and build variables.
///
/// # Errors
/// [`StepError::MissingTestContainers`] if the block is blank before or after expansion.
pub fn test_containers(raw: &str, ctx: &ExecutionContext) -> Result<Vec<String>, StepError> {
    if raw.trim().is_empty() {
        return Err(StepError::MissingTestContainers);
    }

    let block = macros::expand(raw, &ctx.env);
    let containers: Vec<String> = macros::lines(&block)
        .map(|line| macros::expand_all(line, &[&ctx.env, &ctx.build_variables]))
        // Lines are trimmed, not just dropped when empty:
        // " a.dll" becomes "/testcontainer:a.dll".
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if containers.is_empty() {
        return Err(StepError::MissingTestContainers);
    }
    Ok(containers)
}
