//! # Installation Resolver Module / 安装解析模块
//!
//! This module holds the MSTest installation registry and resolves a logical
//! tool name into the executable path to launch on a given node.
//!
//! 此模块保存 MSTest 安装注册表，并将逻辑工具名解析为在指定节点上要启动的可执行文件路径。
//!
//! Resolution derives a node-specific copy of the registered record, then an
//! environment-expanded copy of that. The registered record is never mutated.
//!
//! 解析过程先派生出节点专用的副本，再对其进行环境变量展开。已注册的记录从不被修改。

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::core::macros;
use crate::core::models::{StepError, VarMap};

/// The executable used when no installation is configured or found.
pub const DEFAULT_EXECUTABLE: &str = "mstest.exe";

/// One configured MSTest installation.
/// 一个已配置的 MSTest 安装。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInstallation {
    /// Unique key among all registered installations / 所有已注册安装中的唯一键
    pub name: String,
    /// Path to the executable; may contain `${VAR}` macros / 可执行文件路径，可包含 `${VAR}` 宏
    pub home: String,
    /// Extra arguments applied to every invocation / 每次调用都会附加的参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_args: Option<String>,
    /// When true, `/noisolation` is not passed / 为 true 时不传递 `/noisolation`
    #[serde(default)]
    pub omit_no_isolation: bool,
}

impl ToolInstallation {
    pub fn new(name: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
            default_args: None,
            omit_no_isolation: false,
        }
    }

    /// Returns a copy whose home path is seen through `node`'s filesystem.
    pub fn for_node(&self, node: &ExecutionNode) -> Self {
        Self {
            home: node.translate(&self.home),
            ..self.clone()
        }
    }

    /// Returns a copy whose home path has environment macros expanded.
    pub fn for_environment(&self, env: &VarMap) -> Self {
        Self {
            home: macros::expand(&self.home, env),
            ..self.clone()
        }
    }
}

/// Rewrites paths starting with `from` so they start with `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub from: String,
    pub to: String,
}

/// A machine the runner may execute on, described by how configured paths
/// map onto its filesystem.
///
/// 运行器可能执行所在的机器，通过配置路径如何映射到其文件系统来描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_map: Vec<PathMapping>,
}

impl ExecutionNode {
    /// The node the runner itself is on. Paths are used as configured.
    pub fn local() -> Self {
        Self {
            name: "local".to_string(),
            path_map: Vec::new(),
        }
    }

    /// Applies the first mapping whose `from` prefixes `path`.
    pub fn translate(&self, path: &str) -> String {
        self.path_map
            .iter()
            .find_map(|mapping| {
                path.strip_prefix(mapping.from.as_str())
                    .map(|rest| format!("{}{}", mapping.to, rest))
            })
            .unwrap_or_else(|| path.to_string())
    }
}

/// The registered installations.
///
/// Readers take a snapshot at the start of a run; `replace` swaps the whole
/// list at once so a reader never sees a half-updated registry.
///
/// 已注册的安装列表。
///
/// 读取方在运行开始时获取快照；`replace` 一次性替换整个列表，
/// 因此读取方永远不会看到部分更新的注册表。
#[derive(Debug, Default)]
pub struct ToolRegistry {
    installations: RwLock<Arc<[ToolInstallation]>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installations(installations: Vec<ToolInstallation>) -> Self {
        let registry = Self::new();
        registry.replace(installations);
        registry
    }

    /// Replaces every installation. A later entry with an already seen name
    /// takes the place of the earlier one.
    pub fn replace(&self, installations: Vec<ToolInstallation>) {
        let mut unique: Vec<ToolInstallation> = Vec::with_capacity(installations.len());
        for installation in installations {
            match unique.iter_mut().find(|i| i.name == installation.name) {
                Some(existing) => *existing = installation,
                None => unique.push(installation),
            }
        }

        let mut guard = self
            .installations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = unique.into();
    }

    pub fn snapshot(&self) -> Arc<[ToolInstallation]> {
        self.installations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Looks `name` up in the current snapshot.
    pub fn find(&self, name: &str) -> Result<ToolInstallation, StepError> {
        lookup(&self.snapshot(), name).cloned()
    }
}

/// An installation ready to launch on the current node.
/// 可在当前节点启动的安装。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstallation {
    pub home: String,
    pub default_args: Option<String>,
    pub omit_no_isolation: bool,
}

/// Finds the installation registered under exactly `name`.
pub fn lookup<'a>(
    installations: &'a [ToolInstallation],
    name: &str,
) -> Result<&'a ToolInstallation, StepError> {
    installations
        .iter()
        .find(|i| i.name == name)
        .ok_or_else(|| StepError::InstallationNotFound {
            name: name.to_string(),
        })
}

/// Resolves `tool_name` against a registry snapshot for `node` and `env`.
///
/// Returns `Ok(None)` when the name is empty or unknown; the caller then uses
/// [`DEFAULT_EXECUTABLE`]. A known installation whose derived path cannot be
/// confirmed on disk is a fatal error.
///
/// # Arguments
/// * `tool_name` - The logical installation name from the step configuration
/// * `installations` - Registry snapshot taken at the start of the run
/// * `node` - The node the runner executes on
/// * `env` - The process environment used to expand the home path
pub async fn resolve(
    tool_name: Option<&str>,
    installations: &[ToolInstallation],
    node: &ExecutionNode,
    env: &VarMap,
) -> Result<Option<ResolvedInstallation>, StepError> {
    let Some(name) = tool_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let registered = match lookup(installations, name) {
        Ok(installation) => installation,
        Err(e) if !e.is_fatal() => return Ok(None),
        Err(e) => return Err(e),
    };

    let installation = registered.for_node(node).for_environment(env);

    match tokio::fs::try_exists(&installation.home).await {
        Ok(true) => Ok(Some(ResolvedInstallation {
            home: installation.home,
            default_args: installation.default_args,
            omit_no_isolation: installation.omit_no_isolation,
        })),
        Ok(false) => Err(StepError::InstallationPathMissing {
            path: installation.home,
        }),
        Err(source) => Err(StepError::InstallationCheckFailed {
            path: installation.home,
            source,
        }),
    }
}
