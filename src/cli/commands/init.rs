//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a new step
//! configuration file, either from a documented template or through an
//! interactive wizard.
//!
//! 此模块实现了 `init` 命令，它通过带注释的模板或交互式向导写入新的步骤配置文件。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::{fs, path::Path};

use crate::core::config::{StepConfig, StepFile};
use crate::infra::t;

const DEFAULT_CONFIG: &str = r#"# MSTest step configuration / MSTest 步骤配置

# Language for output messages / 输出消息的语言
language = "en"

[step]
# Installation name from [[installations]]; leave empty to use mstest.exe from PATH
# [[installations]] 中的安装名称；留空则使用 PATH 中的 mstest.exe
tool_name = "VS2019"
# One test container per line; $VAR and ${VAR} are expanded
# 每行一个测试容器；$VAR 和 ${VAR} 会被展开
test_containers = """
bin/Release/MyProject.Tests.dll
"""
# Category filter / 类别过滤器
categories = ""
# Result file relative to the workspace; deleted before each run
# 相对于工作区的结果文件；每次运行前都会被删除
result_file = "TestResults/results.trx"
# Extra arguments passed to MSTest / 传递给 MSTest 的额外参数
extra_args = ""
# Report success even when tests fail / 即使测试失败也报告成功
continue_on_fail = false

[[installations]]
name = "VS2019"
home = '${ProgramFiles(x86)}\Microsoft Visual Studio\2019\Enterprise\Common7\IDE\MSTest.exe'
# default_args = "/detail:errormessage"
# Set to true if this MSTest does not support /noisolation
# 如果此 MSTest 不支持 /noisolation，请设为 true
omit_no_isolation = false

# Remote nodes see installation paths through these prefixes
# 远程节点通过这些前缀查看安装路径
# [[nodes]]
# name = "build-agent-1"
# [[nodes.path_map]]
# from = 'C:\Program Files (x86)'
# to = 'D:\Tools'

# Build variables / 构建变量
[variables]
CONFIGURATION = "Release"
"#;

/// Executes the init command.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `non_interactive` - Write the template without prompting
/// * `force` - Overwrite an existing file
pub fn execute(output: &Path, non_interactive: bool, force: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if output.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", path = output.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = output.display()).to_string())
            .default(false)
            .interact()
            .context(t!("init.prompt_failed").to_string())?;
        if !overwrite {
            println!("{}", t!("init.aborted"));
            return Ok(());
        }
    }

    let content = if non_interactive {
        DEFAULT_CONFIG.to_string()
    } else {
        println!("\n{}", t!("init.wizard_welcome").cyan().bold());
        let step_file = StepFile {
            step: prompt_step(&theme)?,
            ..StepFile::default()
        };
        toml::to_string_pretty(&step_file).context(t!("init.serialize_failed").to_string())?
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;
    }
    fs::write(output, content)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps"));
    Ok(())
}

fn prompt_step(theme: &ColorfulTheme) -> Result<StepConfig> {
    let tool_name: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_tool_name").to_string())
        .allow_empty(true)
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let test_files: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_test_files").to_string())
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let result_file: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_result_file").to_string())
        .default("TestResults/results.trx".to_string())
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let categories: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_categories").to_string())
        .allow_empty(true)
        .interact_text()
        .context(t!("init.prompt_failed").to_string())?;

    let continue_on_fail = Confirm::with_theme(theme)
        .with_prompt(t!("init.prompt_continue_on_fail").to_string())
        .default(false)
        .interact()
        .context(t!("init.prompt_failed").to_string())?;

    Ok(StepConfig {
        tool_name: Some(tool_name).filter(|name| !name.trim().is_empty()),
        test_containers: test_files
            .split(';')
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        categories: Some(categories).filter(|c| !c.trim().is_empty()),
        result_file,
        extra_args: String::new(),
        continue_on_fail,
    })
}
