//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for MSTest Runner,
//! including process execution, result file handling and the build log.
//!
//! 此模块为 MSTest Runner 提供基础设施服务，
//! 包括进程执行、结果文件处理和构建日志。

pub mod command;
pub mod fs;
pub mod log;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
