use clap::{Arg, ArgAction, Command, ValueEnum};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::io::IsTerminal;

use crate::args::ArgumentSpec;
use crate::runner::ExitPolicy;

const LOG_LEVEL_ENV: &str = "CMDRUN_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    None,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub executable: String,
    pub input: String,
    pub args: ArgumentSpec,
    pub env: HashMap<String, String>,
    pub exit_policy: ExitPolicy,
    pub json: bool,
    pub log_level: LogLevel,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingExecutable,
    ConflictingArgs,
    InvalidArg(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingExecutable => write!(f, "You must specify an executable to run"),
            ConfigError::ConflictingArgs => {
                write!(f, "Specify arguments either with --args or after --, not both")
            }
            ConfigError::InvalidArg(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn parse_config() -> Result<Config, ConfigError> {
    let raw_args: Vec<String> = env::args().collect();
    parse_config_from(raw_args)
}

fn parse_config_from(raw_args: Vec<String>) -> Result<Config, ConfigError> {
    if raw_args.len() <= 1 {
        eprintln!("{}", no_args_banner_text());
    }

    let matches = build_cli().get_matches_from(raw_args);

    let executable = matches
        .get_one::<String>("executable")
        .cloned()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingExecutable)?;

    let input = matches
        .get_one::<String>("input")
        .cloned()
        .unwrap_or_default();

    let line = matches.get_one::<String>("args").cloned();
    let trailing: Option<Vec<String>> = matches
        .get_many::<String>("argv")
        .map(|vals| vals.map(|v| v.to_string()).collect());
    let args = match (line, trailing) {
        (Some(_), Some(_)) => return Err(ConfigError::ConflictingArgs),
        (Some(line), None) => ArgumentSpec::Line(line),
        (None, Some(list)) => ArgumentSpec::List(list),
        (None, None) => ArgumentSpec::default(),
    };

    let env_values: Vec<String> = matches
        .get_many::<String>("env")
        .map(|vals| vals.map(|v| v.to_string()).collect())
        .unwrap_or_default();
    let env = parse_env_values(&env_values);

    let exit_policy = if matches.get_flag("strictExit") {
        ExitPolicy::RequireSuccess
    } else {
        ExitPolicy::IgnoreStatus
    };

    let log_level = match matches.get_one::<LogLevel>("logLevel").copied() {
        Some(level) => level,
        None => log_level_from_env(env::var(LOG_LEVEL_ENV).ok().as_deref())?,
    };

    Ok(Config {
        executable,
        input,
        args,
        env,
        exit_policy,
        json: matches.get_flag("json"),
        log_level,
    })
}

fn log_level_from_env(raw: Option<&str>) -> Result<LogLevel, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(LogLevel::None);
    };
    LogLevel::from_str(raw, true).map_err(|_| {
        ConfigError::InvalidArg(format!(
            "{LOG_LEVEL_ENV} must be one of debug, info, none, received: {raw}"
        ))
    })
}

fn build_cli() -> Command {
    Command::new("cmdrun")
        .about("Run an executable with a file, URL, or literal input and print its output")
        .arg(
            Arg::new("executable")
                .value_name("EXECUTABLE")
                .help("Program to run, resolved through PATH"),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .value_name("INPUT")
                .allow_hyphen_values(true)
                .help("File path or URL passed as first argument, otherwise piped to stdin"),
        )
        .arg(
            Arg::new("args")
                .long("args")
                .value_name("LINE")
                .allow_hyphen_values(true)
                .help("Arguments as one line, split on single spaces"),
        )
        .arg(
            Arg::new("env")
                .long("env")
                .action(ArgAction::Append)
                .value_name("KEY=VALUE"),
        )
        .arg(
            Arg::new("strictExit")
                .long("strictExit")
                .action(ArgAction::SetTrue)
                .help("Fail when the program exits unsuccessfully"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the result as a JSON document"),
        )
        .arg(
            Arg::new("logLevel")
                .long("logLevel")
                .value_parser(clap::builder::EnumValueParser::<LogLevel>::new())
                .value_name("debug|info|none"),
        )
        .arg(
            Arg::new("argv")
                .value_name("ARG")
                .num_args(0..)
                .last(true)
                .help("Pre-split arguments, may contain spaces"),
        )
}

fn cli_help_text() -> String {
    let mut command = build_cli();
    let mut bytes = Vec::new();
    if command.write_long_help(&mut bytes).is_ok() {
        return String::from_utf8(bytes).unwrap_or_else(|_| "Usage: cmdrun [OPTIONS]".into());
    }
    "Usage: cmdrun [OPTIONS]".into()
}

fn no_args_banner_text() -> String {
    no_args_banner_text_with_style(should_use_ansi_styling())
}

fn no_args_banner_text_with_style(use_ansi: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", maybe_bold("cmdrun CLI", use_ansi)));
    output.push_str("No executable provided.\n\n");
    output.push_str(&format!("{}\n", maybe_bold("Quick Start", use_ansi)));
    output.push_str("  cmdrun python3 --input ./ngram_analysis.py --args \"4 train.txt test.txt\"\n");
    output.push_str("  cmdrun wc --input \"some literal text\" --args -w\n");
    output.push_str("  cmdrun curl --input https://example.com/data.csv -- --silent\n\n");
    output.push_str(&format!("{}\n", maybe_bold("Full Options", use_ansi)));
    output.push_str(&cli_help_text());
    output
}

fn should_use_ansi_styling() -> bool {
    std::io::stderr().is_terminal() && env::var_os("NO_COLOR").is_none()
}

fn maybe_bold(text: &str, use_ansi: bool) -> String {
    if use_ansi {
        format!("\x1b[1m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn parse_env_values(values: &[String]) -> HashMap<String, String> {
    let mut env_map = HashMap::new();
    for raw in values {
        let Some((key, value)) = raw.split_once('=') else {
            tracing::error!("Invalid env format: {raw}, expected KEY=VALUE, ignoring");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::error!("Invalid env format: {raw}, expected KEY=VALUE, ignoring");
            continue;
        }
        env_map.insert(key.to_string(), value.to_string());
    }
    env_map
}
