//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the `mstest-runner` command line and dispatches to its subcommands.
//!
//! 构建 `mstest-runner` 命令行并分发到各子命令。

pub mod commands;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::t;
use commands::run::RunOptions;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|arg| arg == "--lang")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

pub fn build_cli() -> Command {
    Command::new("mstest-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about").to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config").to_string())
                        .value_name("CONFIG")
                        .default_value(commands::DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("workspace")
                        .short('w')
                        .long("workspace")
                        .help(t!("arg_workspace").to_string())
                        .value_name("WORKSPACE")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("node")
                        .long("node")
                        .help(t!("arg_node").to_string())
                        .value_name("NODE")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("define")
                        .short('D')
                        .long("define")
                        .help(t!("arg_define").to_string())
                        .value_name("NAME=VALUE")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("continue-on-fail")
                        .long("continue-on-fail")
                        .help(t!("arg_continue_on_fail").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about").to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg_config").to_string())
                        .value_name("CONFIG")
                        .default_value(commands::DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg_non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Parses the process arguments and runs the chosen subcommand.
///
/// # Returns
/// Whether the build step passed. `init` always reports `true` on success.
pub async fn run() -> Result<bool> {
    // Pre-parse language so help text is already localized.
    let language = pre_parse_language();
    if let Some(lang) = &language {
        crate::set_language(lang);
    }

    let matches = build_cli().get_matches();
    dispatch(&matches, language).await
}

async fn dispatch(matches: &ArgMatches, language: Option<String>) -> Result<bool> {
    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let options = RunOptions {
                config: run_matches
                    .get_one::<PathBuf>("config")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(commands::DEFAULT_CONFIG_FILE)),
                workspace: run_matches
                    .get_one::<PathBuf>("workspace")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
                node: run_matches.get_one::<String>("node").cloned(),
                defines: run_matches
                    .get_many::<String>("define")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                continue_on_fail: run_matches.get_flag("continue-on-fail"),
                language,
            };
            commands::run::execute(options).await
        }
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(commands::DEFAULT_CONFIG_FILE));
            commands::init::execute(
                &output,
                init_matches.get_flag("non-interactive"),
                init_matches.get_flag("force"),
            )?;
            Ok(true)
        }
        // `subcommand_required` makes clap exit before we get here.
        _ => Ok(false),
    }
}
