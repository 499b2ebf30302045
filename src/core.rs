//! # Core Module / 核心模块
//!
//! This module contains the core functionality of MSTest Runner:
//! data models, configuration, installation resolution, macro expansion,
//! argument building, the outcome policy and the step pipeline itself.
//!
//! 此模块包含 MSTest Runner 的核心功能：
//! 数据模型、配置、安装解析、宏展开、参数构建、结果策略以及步骤流水线本身。

pub mod arguments;
pub mod config;
pub mod execution;
pub mod installation;
pub mod macros;
pub mod models;
pub mod outcome;

// Re-exports
pub use config::{StepConfig, StepFile};
pub use execution::perform;
pub use models::{CommandInvocation, ExecutionContext, StepError};
