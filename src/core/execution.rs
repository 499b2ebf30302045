//! # Step Execution Module / 步骤执行模块
//!
//! This module runs one MSTest build step from start to finish:
//! resolve the installation, clear the old result file, build the command
//! line, launch MSTest, and turn the result into a pass/fail signal.
//!
//! 此模块完整地运行一个 MSTest 构建步骤：
//! 解析安装、清除旧结果文件、构建命令行、启动 MSTest，并将结果转换为通过/失败信号。
//!
//! Each stage returns a `Result` and the first fatal error ends the run with
//! nothing further attempted. There are no retries.
//!
//! 每个阶段都返回 `Result`，第一个致命错误会终止运行且不再进行后续尝试。不做任何重试。

use std::io::ErrorKind;

use crate::{
    core::{
        arguments,
        config::StepConfig,
        installation::{self, DEFAULT_EXECUTABLE, ToolRegistry},
        models::{ExecutionContext, ExecutionError, StepError},
        outcome,
    },
    infra::{command, fs, t},
};

/// Runs the step and reports whether the build should pass.
///
/// Fatal errors are written to the context's sink before `false` is returned.
///
/// # Arguments
/// * `config` - The step configuration
/// * `registry` - Installation registry; a snapshot is taken once, up front
/// * `ctx` - Variables, workspace, node, sink and cancellation for this run
pub async fn perform(config: &StepConfig, registry: &ToolRegistry, ctx: &ExecutionContext) -> bool {
    ctx.sink.info(&t!("run.banner"));

    let result = match launch(config, registry, ctx).await {
        Ok(code) => Ok(code),
        Err(StepError::Execution(e)) => {
            report_execution_error(&e, ctx);
            Err(e)
        }
        Err(e) => {
            ctx.sink.fatal(&e.log_message());
            ctx.sink.fatal(&t!("run.step_failed"));
            return false;
        }
    };

    if let Ok(code) = result {
        ctx.sink.info(&t!("run.exit_code", code = code));
        if code != 0 && config.continue_on_fail {
            ctx.sink.warn(&t!("run.continue_on_fail"));
        }
    }

    let passed = outcome::decide(config.continue_on_fail, &result);
    if passed {
        ctx.sink.info(&t!("run.step_passed"));
    } else {
        ctx.sink.fatal(&t!("run.step_failed"));
    }
    passed
}

/// Every stage up to and including the process run. Returns MSTest's exit code.
async fn launch(
    config: &StepConfig,
    registry: &ToolRegistry,
    ctx: &ExecutionContext,
) -> Result<i32, StepError> {
    let installations = registry.snapshot();
    let resolved =
        installation::resolve(config.tool_name(), &installations, &ctx.node, &ctx.env).await?;

    match (&resolved, config.tool_name()) {
        (Some(found), _) => ctx.sink.info(&t!("run.tool_path", path = &found.home)),
        (None, name) => {
            if let Some(name) = name {
                let not_found = StepError::InstallationNotFound {
                    name: name.to_string(),
                };
                ctx.sink.warn(&not_found.log_message());
            }
            ctx.sink.info(&t!("run.tool_path", path = DEFAULT_EXECUTABLE));
        }
    }

    let result_file = config.result_file()?;
    fs::prepare_result_file(&ctx.workspace, result_file, ctx.sink.as_ref()).await?;

    let invocation = arguments::build(resolved.as_ref(), config, ctx)?;
    ctx.sink.info(&format!(
        "{} {}",
        t!("run.command_prefix"),
        invocation.display()
    ));

    Ok(command::run(&invocation, ctx.sink.clone(), &ctx.cancel).await?)
}

fn report_execution_error(error: &ExecutionError, ctx: &ExecutionContext) {
    if let ExecutionError::Launch { program, source } = error {
        if source.kind() == ErrorKind::NotFound {
            ctx.sink.warn(&t!("run.launch_hint", program = program));
        }
    }
    ctx.sink.fatal(&t!("run.launch_failed", error = error));
}
