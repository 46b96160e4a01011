//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::ids::NegativeIdPolicy;

mod cli;

pub use cli::{
    CliArgs, Command, ContentEventArg, PurgeArgs, ServeArgs, ServeOverrides, UpstreamOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "purgewire";
const ENV_PREFIX: &str = "PURGEWIRE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3080;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 10;
pub(crate) const DEFAULT_PURGE_TIMEOUT_MS: u64 = 3000;
pub(crate) const DEFAULT_STATUS_TIMEOUT_MS: u64 = 2000;
const DEFAULT_STATUS_PATH: &str = "wp-json/wp/v2/posts/{id}?context=edit";
const DEFAULT_COMMENT_PATH: &str = "wp-json/wp/v2/comments/{id}";
const DEFAULT_CDN_API_BASE: &str = "https://api.fastly.com";
const DEFAULT_CDN_AUTH_HEADER: &str = "Fastly-Key";
const ID_PLACEHOLDER: &str = "{id}";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub purge: PurgeSettings,
    pub content_store: ContentStoreSettings,
    pub cdn: CdnSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
    /// Shared secret webhook callers send as a bearer token; `None` disables auth.
    pub webhook_token: Option<String>,
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
pub struct PurgeSettings {
    pub enabled: bool,
    pub purge_timeout: Duration,
    pub status_timeout: Duration,
    pub negative_ids: NegativeIdPolicy,
}

#[derive(Debug, Clone)]
pub struct ContentStoreSettings {
    pub base_url: Url,
    /// Path template for status lookups, relative to `base_url`; contains `{id}`.
    pub status_path: String,
    /// Path template for comment lookups, relative to `base_url`; contains `{id}`.
    pub comment_path: String,
    /// Full `Authorization` header value, e.g. `Basic ...`.
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CdnSettings {
    pub api_base: Url,
    pub service_id: String,
    pub api_token: String,
    pub auth_header: String,
    pub soft_purge: bool,
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

/// Load settings using the configured precedence (file → environment → CLI).
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
        Some(Command::Purge(args)) => {
            raw.apply_upstream_overrides(&args.upstream);
            if let Some(level) = args.log_level.as_ref() {
                raw.logging.level = Some(level.clone());
            }
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
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
    purge: RawPurgeSettings,
    content_store: RawContentStoreSettings,
    cdn: RawCdnSettings,
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
        if let Some(token) = overrides.webhook_token.as_ref() {
            self.server.webhook_token = Some(token.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        self.apply_upstream_overrides(&overrides.upstream);
    }

    fn apply_upstream_overrides(&mut self, overrides: &UpstreamOverrides) {
        if let Some(url) = overrides.content_store_url.as_ref() {
            self.content_store.base_url = Some(url.clone());
        }
        if let Some(url) = overrides.cdn_api_base.as_ref() {
            self.cdn.api_base = Some(url.clone());
        }
        if let Some(id) = overrides.cdn_service_id.as_ref() {
            self.cdn.service_id = Some(id.clone());
        }
        if let Some(soft) = overrides.cdn_soft_purge {
            self.cdn.soft_purge = Some(soft);
        }
        if let Some(enabled) = overrides.purge_enabled {
            self.purge.enabled = Some(enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            purge,
            content_store,
            cdn,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let purge = build_purge_settings(purge)?;
        let content_store = build_content_store_settings(content_store)?;
        let cdn = build_cdn_settings(cdn)?;

        Ok(Self {
            server,
            logging,
            purge,
            content_store,
            cdn,
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
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

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
        webhook_token: non_empty(server.webhook_token),
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

fn build_purge_settings(purge: RawPurgeSettings) -> Result<PurgeSettings, LoadError> {
    let purge_timeout_ms = purge.purge_timeout_ms.unwrap_or(DEFAULT_PURGE_TIMEOUT_MS);
    if purge_timeout_ms == 0 {
        return Err(LoadError::invalid(
            "purge.purge_timeout_ms",
            "must be greater than zero",
        ));
    }

    let status_timeout_ms = purge.status_timeout_ms.unwrap_or(DEFAULT_STATUS_TIMEOUT_MS);
    if status_timeout_ms == 0 {
        return Err(LoadError::invalid(
            "purge.status_timeout_ms",
            "must be greater than zero",
        ));
    }

    let negative_ids = match purge.negative_ids.as_deref().map(str::trim) {
        None | Some("") => NegativeIdPolicy::default(),
        Some(value) if value.eq_ignore_ascii_case("reject") => NegativeIdPolicy::Reject,
        Some(value) if value.eq_ignore_ascii_case("absolute") => NegativeIdPolicy::Absolute,
        Some(other) => {
            return Err(LoadError::invalid(
                "purge.negative_ids",
                format!("expected `reject` or `absolute`, got `{other}`"),
            ));
        }
    };

    Ok(PurgeSettings {
        enabled: purge.enabled.unwrap_or(true),
        purge_timeout: Duration::from_millis(purge_timeout_ms),
        status_timeout: Duration::from_millis(status_timeout_ms),
        negative_ids,
    })
}

fn build_content_store_settings(
    store: RawContentStoreSettings,
) -> Result<ContentStoreSettings, LoadError> {
    let base_url = match non_empty(store.base_url) {
        Some(value) => parse_base_url(&value, "content_store.base_url")?,
        None => {
            return Err(LoadError::invalid(
                "content_store.base_url",
                "a content store URL is required",
            ));
        }
    };

    let status_path = path_template(
        store.status_path,
        DEFAULT_STATUS_PATH,
        "content_store.status_path",
    )?;
    let comment_path = path_template(
        store.comment_path,
        DEFAULT_COMMENT_PATH,
        "content_store.comment_path",
    )?;

    Ok(ContentStoreSettings {
        base_url,
        status_path,
        comment_path,
        authorization: non_empty(store.authorization),
    })
}

fn build_cdn_settings(cdn: RawCdnSettings) -> Result<CdnSettings, LoadError> {
    let api_base = non_empty(cdn.api_base).unwrap_or_else(|| DEFAULT_CDN_API_BASE.to_string());
    let api_base = parse_base_url(&api_base, "cdn.api_base")?;

    let service_id = non_empty(cdn.service_id)
        .ok_or_else(|| LoadError::invalid("cdn.service_id", "a CDN service id is required"))?;
    if service_id.contains('/') {
        return Err(LoadError::invalid(
            "cdn.service_id",
            "must not contain `/`",
        ));
    }

    let api_token = non_empty(cdn.api_token)
        .ok_or_else(|| LoadError::invalid("cdn.api_token", "a CDN API token is required"))?;

    let auth_header =
        non_empty(cdn.auth_header).unwrap_or_else(|| DEFAULT_CDN_AUTH_HEADER.to_string());
    if !auth_header
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
    {
        return Err(LoadError::invalid(
            "cdn.auth_header",
            format!("`{auth_header}` is not a valid header name"),
        ));
    }

    Ok(CdnSettings {
        api_base,
        service_id,
        api_token,
        auth_header,
        soft_purge: cdn.soft_purge.unwrap_or(false),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
    webhook_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPurgeSettings {
    enabled: Option<bool>,
    purge_timeout_ms: Option<u64>,
    status_timeout_ms: Option<u64>,
    negative_ids: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentStoreSettings {
    base_url: Option<String>,
    status_path: Option<String>,
    comment_path: Option<String>,
    authorization: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCdnSettings {
    api_base: Option<String>,
    service_id: Option<String>,
    api_token: Option<String>,
    auth_header: Option<String>,
    soft_purge: Option<bool>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

/// Parse a base URL, normalising it to end with `/` so relative joins keep its path.
fn parse_base_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let mut url =
        Url::parse(value).map_err(|err| LoadError::invalid(key, format!("invalid URL: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "URL scheme must be http or https"));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn path_template(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    let template = non_empty(value).unwrap_or_else(|| default.to_string());
    if !template.contains(ID_PLACEHOLDER) {
        return Err(LoadError::invalid(
            key,
            format!("template must contain `{ID_PLACEHOLDER}`"),
        ));
    }
    Ok(template.trim_start_matches('/').to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
