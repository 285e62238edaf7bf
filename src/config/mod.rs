//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::goal::GoalSettings;
use crate::domain::calendar::parse_iso_date;
use crate::domain::goal::{
    DEFAULT_GOAL_END, DEFAULT_GOAL_START, DEFAULT_TARGET_VALUE, GoalWindow, MilestoneDefinition,
    default_milestones,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "pulseboard";
const ENV_PREFIX: &str = "PULSEBOARD";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_GOAL_TIMEZONE: &str = "America/Sao_Paulo";
const DEFAULT_IMAGE_DIR: &str = "uploads";
const DEFAULT_IMAGE_PUBLIC_BASE: &str = "/uploads";
const DEFAULT_IMAGE_FOLDER: &str = "pulseboard";
const DEFAULT_IMAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=600&h=400&fit=crop";

/// Command-line arguments for the Pulseboard binary.
#[derive(Debug, Parser)]
#[command(name = "pulseboard", version, about = "Pulseboard dashboard server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PULSEBOARD_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Read a password from stdin and print its argon2 hash.
    #[command(name = "hash-password")]
    HashPassword,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the timezone used to decide the current date.
    #[arg(long = "goal-timezone", value_name = "TZ")]
    pub goal_timezone: Option<String>,

    /// Override the image provider (none|filesystem|remote).
    #[arg(long = "images-provider", value_name = "PROVIDER")]
    pub images_provider: Option<String>,

    /// Override the directory used by the filesystem image provider.
    #[arg(long = "images-directory", value_name = "PATH")]
    pub images_directory: Option<PathBuf>,

    /// Override the maximum accepted image size in bytes.
    #[arg(long = "images-max-bytes", value_name = "BYTES")]
    pub images_max_bytes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub goal: GoalSettings,
    pub images: ImageSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Without a URL the server keeps its records in process memory.
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub provider: ImageProvider,
    pub max_bytes: NonZeroU64,
    pub placeholder_url: String,
}

#[derive(Debug, Clone)]
pub enum ImageProvider {
    /// No image host: uploads resolve to the placeholder image.
    Unconfigured,
    Filesystem {
        directory: PathBuf,
        public_base_url: String,
    },
    Remote {
        endpoint: Url,
        api_key: Option<String>,
        folder: String,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::HashPassword) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    goal: RawGoalSettings,
    images: RawImageSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(timezone) = overrides.goal_timezone.as_ref() {
            self.goal.timezone = Some(timezone.clone());
        }
        if let Some(provider) = overrides.images_provider.as_ref() {
            self.images.provider = Some(provider.clone());
        }
        if let Some(directory) = overrides.images_directory.as_ref() {
            self.images.directory = Some(directory.clone());
        }
        if let Some(max) = overrides.images_max_bytes {
            self.images.max_bytes = Some(max);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            goal,
            images,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            goal: build_goal_settings(goal)?,
            images: build_image_settings(images)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.host", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_empty(database.url);
    let max_connections = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

    Ok(DatabaseSettings {
        url,
        max_connections: non_zero_u32(max_connections.into(), "database.max_connections")?,
    })
}

fn build_goal_settings(goal: RawGoalSettings) -> Result<GoalSettings, LoadError> {
    let start = match goal.start_date {
        Some(value) => parse_date(&value, "goal.start_date")?,
        None => DEFAULT_GOAL_START,
    };
    let end = match goal.end_date {
        Some(value) => parse_date(&value, "goal.end_date")?,
        None => DEFAULT_GOAL_END,
    };
    let window = GoalWindow::new(start, end)
        .map_err(|err| LoadError::invalid("goal.start_date", err.to_string()))?;

    let target_value = goal.target_value.unwrap_or(DEFAULT_TARGET_VALUE);
    if target_value == 0 {
        return Err(LoadError::invalid(
            "goal.target_value",
            "must be greater than zero",
        ));
    }

    let timezone_name = goal
        .timezone
        .unwrap_or_else(|| DEFAULT_GOAL_TIMEZONE.to_string());
    let timezone = Tz::from_str(timezone_name.trim()).map_err(|err| {
        LoadError::invalid("goal.timezone", format!("unknown timezone: {err}"))
    })?;

    let milestones = match goal.milestones {
        Some(raw) => raw
            .into_iter()
            .map(build_milestone)
            .collect::<Result<Vec<_>, _>>()?,
        None => default_milestones(),
    };

    Ok(GoalSettings {
        window,
        target_value,
        timezone,
        milestones,
    })
}

fn build_milestone(raw: RawMilestone) -> Result<MilestoneDefinition, LoadError> {
    let date = parse_date(&raw.date, "goal.milestones.date")?;
    if raw.percentage > 100 {
        return Err(LoadError::invalid(
            "goal.milestones.percentage",
            format!("{} exceeds 100", raw.percentage),
        ));
    }
    Ok(MilestoneDefinition::new(
        date,
        raw.title,
        raw.description,
        raw.percentage,
    ))
}

fn build_image_settings(images: RawImageSettings) -> Result<ImageSettings, LoadError> {
    let provider_name = images
        .provider
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "none".to_string());

    let provider = match provider_name.as_str() {
        "none" | "" => ImageProvider::Unconfigured,
        "filesystem" => {
            let directory = images
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR));
            if directory.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "images.directory",
                    "path must not be empty",
                ));
            }
            let public_base_url = non_empty(images.public_base_url)
                .unwrap_or_else(|| DEFAULT_IMAGE_PUBLIC_BASE.to_string());
            ImageProvider::Filesystem {
                directory,
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
            }
        }
        "remote" => {
            let endpoint = non_empty(images.endpoint).ok_or_else(|| {
                LoadError::invalid("images.endpoint", "required for the remote provider")
            })?;
            let endpoint = Url::parse(&endpoint)
                .map_err(|err| LoadError::invalid("images.endpoint", err.to_string()))?;
            ImageProvider::Remote {
                endpoint,
                api_key: non_empty(images.api_key),
                folder: non_empty(images.folder)
                    .unwrap_or_else(|| DEFAULT_IMAGE_FOLDER.to_string()),
            }
        }
        other => {
            return Err(LoadError::invalid(
                "images.provider",
                format!("unknown provider `{other}`"),
            ));
        }
    };

    let max_bytes = NonZeroU64::new(images.max_bytes.unwrap_or(DEFAULT_IMAGE_MAX_BYTES))
        .ok_or_else(|| LoadError::invalid("images.max_bytes", "must be greater than zero"))?;
    usize::try_from(max_bytes.get()).map_err(|_| {
        LoadError::invalid(
            "images.max_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(ImageSettings {
        provider,
        max_bytes,
        placeholder_url: non_empty(images.placeholder_url)
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGoalSettings {
    start_date: Option<String>,
    end_date: Option<String>,
    target_value: Option<u32>,
    timezone: Option<String>,
    milestones: Option<Vec<RawMilestone>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMilestone {
    date: String,
    title: String,
    #[serde(default)]
    description: String,
    percentage: u8,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawImageSettings {
    provider: Option<String>,
    directory: Option<PathBuf>,
    public_base_url: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    folder: Option<String>,
    max_bytes: Option<u64>,
    placeholder_url: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_date(value: &str, key: &'static str) -> Result<time::Date, LoadError> {
    parse_iso_date(value)
        .map_err(|err| LoadError::invalid(key, format!("expected YYYY-MM-DD: {err}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    let value: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
