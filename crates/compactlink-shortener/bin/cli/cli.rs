use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::{Display, Formatter};

pub const MACHINE_ID_ENV: &str = "COMPACTLINK_MACHINE_ID";
pub const BASE_URL_ENV: &str = "COMPACTLINK_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "COMPACTLINK_LOG_FORMAT";

pub const DEFAULT_MACHINE_ID: i64 = 1;
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "compactlink", about = "Mint compact 7-character short codes")]
pub struct CLI {
    /// Machine id of this instance, 0-255. Must be unique per deployed instance.
    #[arg(
        long,
        env = MACHINE_ID_ENV,
        default_value_t = DEFAULT_MACHINE_ID,
        allow_negative_numbers = true,
        global = true
    )]
    pub machine_id: i64,

    /// Prefix for rendered short URLs.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text,
        global = true
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mint short codes and print one per line.
    Mint {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Shorten URLs against an in-memory store and print the results as JSON lines.
    Shorten {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Expire the short URLs after this many days.
        #[arg(long)]
        expire_days: Option<u64>,
    },
}
