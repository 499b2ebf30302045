//! # Build Log Module / 构建日志模块
//!
//! The sink every stage of a run writes its log lines to, with a colored
//! console implementation and an in-memory one for tests and embedding.
//!
//! 运行的各个阶段写入日志行的输出目标，提供彩色控制台实现以及用于测试和嵌入的内存实现。

use colored::*;
use std::sync::{Mutex, PoisonError};

/// Where a run's log lines go.
pub trait LogSink: Send + Sync {
    /// Progress notes / 进度信息
    fn info(&self, message: &str);
    /// Something unexpected that does not stop the run / 不会中止运行的异常情况
    fn warn(&self, message: &str);
    /// The reason a run is aborting / 运行中止的原因
    fn fatal(&self, message: &str);
    /// A raw line of the test runner's console output / 测试运行器的原始控制台输出行
    fn output(&self, line: &str);
}

/// Writes to stdout, colored by level. Fatal errors go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn info(&self, message: &str) {
        println!("{}", message.blue());
    }

    fn warn(&self, message: &str) {
        println!("{}", message.yellow());
    }

    fn fatal(&self, message: &str) {
        eprintln!("{} {}", "FATAL:".red().bold(), message.red());
    }

    fn output(&self, line: &str) {
        println!("{line}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Fatal,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub text: String,
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines logged at `level`, in order.
    pub fn texts(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .map(|line| line.text)
            .collect()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.text.contains(needle))
    }

    fn push(&self, level: LogLevel, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogLine {
                level,
                text: text.to_string(),
            });
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn fatal(&self, message: &str) {
        self.push(LogLevel::Fatal, message);
    }

    fn output(&self, line: &str) {
        self.push(LogLevel::Output, line);
    }
}
