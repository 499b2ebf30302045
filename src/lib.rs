//! # MSTest Runner Library / MSTest Runner 库
//!
//! This library provides the core functionality for the MSTest Runner tool,
//! a configuration-driven build step that runs MSTest against a workspace
//! and turns its exit code into a build outcome.
//!
//! 此库为 MSTest Runner 工具提供核心功能，
//! 这是一个配置驱动的构建步骤，在工作区中运行 MSTest 并将其退出码转换为构建结果。
//!
//! ## Modules / 模块
//!
//! - `core` - Step configuration, installation resolution, argument building and the step pipeline
//! - `infra` - Process execution, result artifact handling and the build log sink
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 步骤配置、安装解析、参数构建和步骤流水线
//! - `infra` - 进程执行、结果文件处理和构建日志输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the language
/// code (e.g., "en"), and finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the output language, falling back the same way [`init`] does.
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
