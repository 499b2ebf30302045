//! # Configuration Module / 配置模块
//!
//! Step configuration and the TOML file it is loaded from.
//!
//! 步骤配置以及加载它的 TOML 文件。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::installation::{ExecutionNode, ToolInstallation};
use crate::core::models::{StepError, VarMap};
use crate::infra::t;

/// The user-facing settings of one MSTest build step.
///
/// Nothing is validated on construction: whether the result file and test
/// containers are usable depends on the environment at run time.
///
/// 一个 MSTest 构建步骤的用户设置。
///
/// 构造时不做任何校验：结果文件和测试容器是否可用取决于运行时的环境。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Logical installation name; empty means `mstest.exe` from PATH.
    /// 逻辑安装名；为空表示使用 PATH 中的 `mstest.exe`。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Newline-separated test containers, may contain macros.
    /// 以换行分隔的测试容器，可包含宏。
    #[serde(alias = "test_files")]
    pub test_containers: String,
    /// Category filter expression.
    /// 类别过滤表达式。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    /// Result file, relative to the workspace.
    /// 结果文件，相对于工作区。
    pub result_file: String,
    /// Extra whitespace-separated arguments, may contain macros.
    /// 额外的以空白分隔的参数，可包含宏。
    #[serde(alias = "cmd_line_args")]
    pub extra_args: String,
    /// Report success even when MSTest exits non-zero.
    /// 即使 MSTest 以非零码退出也报告成功。
    pub continue_on_fail: bool,
}

impl StepConfig {
    /// The trimmed tool name, if one was given.
    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// The trimmed result file path, or [`StepError::MissingResultFile`].
    pub fn result_file(&self) -> Result<&str, StepError> {
        let result_file = self.result_file.trim();
        if result_file.is_empty() {
            Err(StepError::MissingResultFile)
        } else {
            Ok(result_file)
        }
    }

    /// The trimmed category filter, if non-empty.
    pub fn categories(&self) -> Option<&str> {
        self.categories
            .as_deref()
            .map(str::trim)
            .filter(|categories| !categories.is_empty())
    }
}

/// The on-disk configuration: one step plus the installations, nodes and
/// build variables it runs with.
///
/// 磁盘上的配置：一个步骤，以及运行它所需的安装、节点和构建变量。
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StepFile {
    /// Output language (e.g. "en", "zh-CN"). `--lang` takes precedence.
    /// 输出语言（例如 "en"、"zh-CN"）。`--lang` 优先。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub step: StepConfig,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installations: Vec<ToolInstallation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<ExecutionNode>,

    #[serde(default, skip_serializing_if = "VarMap::is_empty")]
    pub variables: VarMap,
}

impl StepFile {
    /// Reads and parses a step file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("config_read_failed_path", path = path.display()).to_string())?;
        Self::parse(&content)
            .with_context(|| t!("config_parse_failed", path = path.display()).to_string())
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Looks up a configured node by name.
    pub fn node(&self, name: &str) -> Option<&ExecutionNode> {
        self.nodes.iter().find(|node| node.name == name)
    }
}
