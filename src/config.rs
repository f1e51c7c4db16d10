use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use finanza_core::AmountPolicy;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "finanza", about = "Finanza - personal income and expense tracker")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "finanza.toml")]
    pub config: String,

    /// Database file, or ":memory:" for a throwaway store (overrides config file)
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Telegram bot token (overrides config file)
    #[arg(long, env = "FINANZA_TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Mode {
    /// Interactive menu on stdin/stdout (default)
    Console,
    /// Serve the Telegram webhook
    Serve,
    /// Register <url>/webhook/<token> with Telegram and exit
    SetWebhook {
        /// Public base URL that reaches this server
        #[arg(long)]
        url: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default = "default_telegram")]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// How long a unit of work waits on a locked database file.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// When set, `serve` registers the webhook under this URL at startup.
    #[serde(default)]
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidationConfig {
    #[serde(default = "default_allow_negative")]
    pub allow_negative_amounts: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_negative_amounts: default_allow_negative(),
        }
    }
}

impl ValidationConfig {
    pub fn amount_policy(&self) -> AmountPolicy {
        AmountPolicy {
            allow_negative: self.allow_negative_amounts,
        }
    }
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        path: default_db_path(),
        busy_timeout_ms: default_busy_timeout_ms(),
    }
}

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_telegram() -> TelegramConfig {
    TelegramConfig {
        token: String::new(),
        api_base: default_api_base(),
        public_url: None,
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("finanza.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_allow_negative() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: default_storage(),
            server: default_server(),
            logging: default_logging(),
            telegram: default_telegram(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref db) = cli.db {
            config.storage.path = db.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref token) = cli.telegram_token {
            config.telegram.token = token.clone();
        }

        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid listen address: {}", e)))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.busy_timeout_ms)
    }
}
