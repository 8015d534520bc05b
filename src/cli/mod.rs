//! Command-line interface for iot-portal.
//!
//! This module handles CLI argument parsing. One-shot backend subcommands
//! (`list`, `remove`) are implemented in the [`commands`] submodule and run
//! on the tokio runtime after configuration is loaded.

pub mod commands;

use crate::editor::EditorKind;
use clap::{Parser, Subcommand};
use iot_portal_client::{ControlAction, SearchParams, SortOrder};
use std::path::PathBuf;

/// Editor kind argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EditorKindArg {
    Channel,
    Plugin,
    ProjectAdapter,
    Tunnel,
    Link,
    Device,
    Model,
}

impl From<EditorKindArg> for EditorKind {
    fn from(arg: EditorKindArg) -> Self {
        match arg {
            EditorKindArg::Channel => EditorKind::Channel,
            EditorKindArg::Plugin => EditorKind::Plugin,
            EditorKindArg::ProjectAdapter => EditorKind::ProjectAdapter,
            EditorKindArg::Tunnel => EditorKind::Tunnel,
            EditorKindArg::Link => EditorKind::Link,
            EditorKindArg::Device => EditorKind::Device,
            EditorKindArg::Model => EditorKind::Model,
        }
    }
}

/// iot-portal - administration console for IoT backend entities
#[derive(Parser)]
#[command(name = "iot-portal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend API base URL (overrides config and IOT_PORTAL_API_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of records of a kind
    List {
        #[arg(value_enum)]
        kind: EditorKindArg,

        /// Free-text search
        #[arg(long)]
        keyword: Option<String>,

        /// Index of the first record
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Page size (defaults to workspace.page_size from config)
        #[arg(long)]
        length: Option<u32>,

        /// Field to sort by (backend default: newest first)
        #[arg(long, value_name = "KEY")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Keep rows whose KEY is one of the comma-separated values (repeatable)
        #[arg(long, value_name = "KEY=V1,V2", value_parser = parse_filter)]
        filter: Vec<(String, Vec<String>)>,
    },

    /// Delete one record
    Remove {
        #[arg(value_enum)]
        kind: EditorKindArg,

        id: u64,
    },

    /// Start a saved channel
    Start { id: u64 },

    /// Stop a running channel
    Stop { id: u64 },

    /// Print the configuration file path
    ConfigPath,
}

fn parse_filter(raw: &str) -> Result<(String, Vec<String>), String> {
    let (key, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=V1,V2, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{}'", raw));
    }
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    Ok((key.to_string(), values))
}

/// Backend operation to run instead of the interactive console
#[derive(Clone, Debug)]
pub enum OneShot {
    List {
        kind: EditorKind,
        keyword: Option<String>,
        offset: u32,
        length: Option<u32>,
        sort: Option<(String, SortOrder)>,
        filters: Vec<(String, Vec<String>)>,
    },
    Remove {
        kind: EditorKind,
        id: u64,
    },
    /// `start` / `stop` on a channel
    Control {
        id: u64,
        action: ControlAction,
    },
}

impl OneShot {
    /// Search parameters for `List`, using `page_size` when no length was given
    pub fn search_params(&self, page_size: u32) -> Option<SearchParams> {
        match self {
            OneShot::List {
                keyword,
                offset,
                length,
                sort,
                filters,
                ..
            } => {
                let mut params =
                    SearchParams::page(length.unwrap_or(page_size)).with_offset(*offset);
                if let Some(keyword) = keyword {
                    params = params.with_keyword(keyword.clone());
                }
                for (key, values) in filters {
                    params = params.with_filter(key.clone(), values.clone());
                }
                if let Some((key, order)) = sort {
                    params = params.sorted_by(key.clone(), *order);
                }
                Some(params)
            }
            OneShot::Remove { .. } | OneShot::Control { .. } => None,
        }
    }
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Explicit config file
    pub config_path: Option<PathBuf>,
    /// API base URL override
    pub api_url: Option<String>,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
    /// Subcommand to run; `None` starts the console
    pub one_shot: Option<OneShot>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with normal application startup, with optional runtime options
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands that need no backend
pub fn process_cli() -> CliResult {
    resolve(Cli::parse())
}

fn resolve(cli: Cli) -> CliResult {
    let one_shot = match cli.command {
        Some(Commands::ConfigPath) => {
            let path = cli
                .config
                .unwrap_or_else(iot_portal_config::Config::config_path);
            println!("{}", path.display());
            return CliResult::Exit(0);
        }
        Some(Commands::List {
            kind,
            keyword,
            offset,
            length,
            sort,
            desc,
            filter,
        }) => Some(OneShot::List {
            kind: kind.into(),
            keyword,
            offset,
            length,
            sort: sort.map(|key| {
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                (key, order)
            }),
            filters: filter,
        }),
        Some(Commands::Remove { kind, id }) => Some(OneShot::Remove {
            kind: kind.into(),
            id,
        }),
        Some(Commands::Start { id }) => Some(OneShot::Control {
            id,
            action: ControlAction::Start,
        }),
        Some(Commands::Stop { id }) => Some(OneShot::Control {
            id,
            action: ControlAction::Stop,
        }),
        None => None,
    };

    CliResult::Continue(RuntimeOptions {
        config_path: cli.config,
        api_url: cli.api_url,
        log_level: cli.log_level.map(|l| l.to_level_filter()),
        one_shot,
    })
}
