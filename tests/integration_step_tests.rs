//! # Step Integration Tests / 步骤集成测试
//!
//! These tests run whole steps through `perform` against a fake MSTest script
//! and check the command line it received, the build log and the outcome.
//!
//! 这些测试通过 `perform` 针对一个模拟的 MSTest 脚本运行完整步骤，
//! 并检查其收到的命令行、构建日志和结果。

#![cfg(unix)]

mod common;

use common::{fake_installation, memory_context, recorded_args, vars, workspace, write_fake_mstest};
use mstest_runner::core::config::StepConfig;
use mstest_runner::core::execution::perform;
use mstest_runner::core::installation::{ToolInstallation, ToolRegistry};
use mstest_runner::infra::log::LogLevel;
use std::fs;
use std::time::Duration;

fn step(result_file: &str, continue_on_fail: bool) -> StepConfig {
    StepConfig {
        tool_name: Some("fake".to_string()),
        test_containers: "a.dll\nb.dll".to_string(),
        result_file: result_file.to_string(),
        continue_on_fail,
        ..StepConfig::default()
    }
}

#[tokio::test]
async fn test_successful_run() {
    let dir = workspace();
    let script = write_fake_mstest(dir.path());
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());

    assert!(perform(&step("out.trx", false), &registry, &ctx).await);

    assert_eq!(
        recorded_args(dir.path()).unwrap(),
        vec![
            "/resultsfile:out.trx",
            "/noisolation",
            "/testcontainer:a.dll",
            "/testcontainer:b.dll",
        ]
    );
    assert!(sink.contains("Path To MSTest.exe: /bin/sh"));
    assert!(sink.texts(LogLevel::Output).contains(&"Loading tests...".to_string()));
    assert!(sink.texts(LogLevel::Output).contains(&"warning from mstest".to_string()));
    assert!(sink.contains("MSTest step PASSED"));
}

#[tokio::test]
async fn test_failing_tests_respect_continue_on_fail() {
    for (continue_on_fail, expected) in [(true, true), (false, false)] {
        let dir = workspace();
        let script = write_fake_mstest(dir.path());
        let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
        let (ctx, sink) = memory_context(dir.path());
        let ctx = ctx.with_env(vars(&[("FAKE_MSTEST_EXIT", "1")]));

        assert_eq!(perform(&step("out.trx", continue_on_fail), &registry, &ctx).await, expected);
        assert!(sink.contains("MSTest exited with code 1"));
    }
}

#[tokio::test]
async fn test_stale_result_file_is_removed_before_launch() {
    let dir = workspace();
    let script = write_fake_mstest(dir.path());
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());
    fs::write(dir.path().join("out.trx"), "stale").unwrap();

    assert!(perform(&step("out.trx", false), &registry, &ctx).await);

    assert!(!dir.path().join("out.trx").exists());
    assert!(sink.contains("Delete old result file"));
}

#[tokio::test]
async fn test_missing_result_file_aborts_before_launch() {
    let dir = workspace();
    let script = write_fake_mstest(dir.path());
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());

    assert!(!perform(&step("  ", true), &registry, &ctx).await);

    assert!(recorded_args(dir.path()).is_none());
    assert!(sink
        .texts(LogLevel::Fatal)
        .contains(&"Result file name was not specified".to_string()));
}

#[tokio::test]
async fn test_missing_test_containers_abort_after_cleanup() {
    let dir = workspace();
    let script = write_fake_mstest(dir.path());
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());
    let ctx = ctx.with_build_variables(vars(&[("NOTHING", "")]));
    fs::write(dir.path().join("out.trx"), "stale").unwrap();
    let config = StepConfig {
        test_containers: "${NOTHING}".to_string(),
        ..step("out.trx", true)
    };

    assert!(!perform(&config, &registry, &ctx).await);

    assert!(recorded_args(dir.path()).is_none());
    assert!(!dir.path().join("out.trx").exists());
    assert!(sink.texts(LogLevel::Fatal).contains(&"No test files are specified".to_string()));
}

#[tokio::test]
async fn test_missing_installation_home_aborts() {
    let dir = workspace();
    let registry = ToolRegistry::with_installations(vec![ToolInstallation::new(
        "fake",
        "${TOOLS}/mstest.exe",
    )]);
    let (ctx, sink) = memory_context(dir.path());
    let ctx = ctx.with_env(vars(&[("TOOLS", "/definitely/not/here")]));
    fs::write(dir.path().join("out.trx"), "stale").unwrap();

    assert!(!perform(&step("out.trx", true), &registry, &ctx).await);

    assert!(sink.contains("/definitely/not/here/mstest.exe doesn't exist"));
    // Nothing after resolution ran.
    assert!(dir.path().join("out.trx").exists());
}

#[tokio::test]
async fn test_unknown_installation_falls_back_and_launch_failure_fails() {
    for continue_on_fail in [false, true] {
        let dir = workspace();
        let registry = ToolRegistry::new();
        let (ctx, sink) = memory_context(dir.path());
        // Make sure mstest.exe cannot be found on PATH.
        let ctx = ctx.with_env(vars(&[("PATH", dir.path().to_str().unwrap())]));

        assert!(!perform(&step("out.trx", continue_on_fail), &registry, &ctx).await);

        assert!(sink.contains("No MSTest installation named 'fake'"));
        assert!(sink.contains("Path To MSTest.exe: mstest.exe"));
        assert!(sink.contains("MSTest command execution failed"));
    }
}

#[tokio::test]
async fn test_macros_reach_the_command_line() {
    let dir = workspace();
    let script = write_fake_mstest(dir.path());
    let mut installation = fake_installation("fake", &script);
    installation.omit_no_isolation = true;
    let registry = ToolRegistry::with_installations(vec![installation]);
    let (ctx, _) = memory_context(dir.path());
    let ctx = ctx
        .with_env(vars(&[("OUT", "bin")]))
        .with_build_variables(vars(&[("CONFIG", "Release")]));
    let config = StepConfig {
        test_containers: "$OUT/${CONFIG}/a.dll\n\n".to_string(),
        categories: Some(" Smoke ".to_string()),
        extra_args: "/detail:owner\r\n\"/testsettings:my ${CONFIG}.testsettings\"".to_string(),
        ..step("TestResults/out.trx", false)
    };

    assert!(perform(&config, &registry, &ctx).await);

    assert_eq!(
        recorded_args(dir.path()).unwrap(),
        vec![
            "/resultsfile:TestResults/out.trx",
            "/detail:owner",
            "/testsettings:my Release.testsettings",
            "/category:\"Smoke\"",
            "/testcontainer:bin/Release/a.dll",
        ]
    );
}

#[tokio::test]
async fn test_cancelled_run_fails() {
    let dir = workspace();
    let script = dir.path().join("slow.sh");
    fs::write(&script, "exec sleep 30\n").unwrap();
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
    });

    assert!(!perform(&step("out.trx", true), &registry, &ctx).await);
    assert!(sink.contains("run was cancelled"));
}

#[tokio::test]
async fn test_non_utf8_console_output_keeps_a_passing_run_passing() {
    let dir = workspace();
    let script = dir.path().join("latin1.sh");
    fs::write(&script, "printf 'before\\ncaf\\351\\nafter\\nPassed 10/10\\n'\nexit 0\n").unwrap();
    let registry = ToolRegistry::with_installations(vec![fake_installation("fake", &script)]);
    let (ctx, sink) = memory_context(dir.path());

    assert!(perform(&step("out.trx", false), &registry, &ctx).await);

    let output = sink.texts(LogLevel::Output);
    assert_eq!(output.len(), 4);
    assert_eq!(output[3], "Passed 10/10");
    assert!(sink.texts(LogLevel::Fatal).is_empty());
}
