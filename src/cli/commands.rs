//! # CLI Commands / 命令行子命令

pub mod init;
pub mod run;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "MsTest.toml";
