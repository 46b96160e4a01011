use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

use crate::purge::TransitionKind;

/// Command-line arguments for the purgewire binary.
#[derive(Debug, Parser)]
#[command(
    name = "purgewire",
    version,
    about = "Surrogate-key CDN purge trigger"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PURGEWIRE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the webhook listener.
    Serve(Box<ServeArgs>),
    /// Run one content transition through the purge pipeline.
    Purge(PurgeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct UpstreamOverrides {
    /// Override the content store base URL.
    #[arg(long = "content-store-url", value_name = "URL")]
    pub content_store_url: Option<String>,

    /// Override the CDN purge API base URL.
    #[arg(long = "cdn-api-base", value_name = "URL")]
    pub cdn_api_base: Option<String>,

    /// Override the CDN service identifier.
    #[arg(long = "cdn-service-id", value_name = "ID")]
    pub cdn_service_id: Option<String>,

    /// Toggle soft purges.
    #[arg(
        long = "cdn-soft-purge",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cdn_soft_purge: Option<bool>,

    /// Toggle purging altogether.
    #[arg(
        long = "purge-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub purge_enabled: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the shared secret webhook callers must present.
    #[arg(long = "webhook-token", value_name = "TOKEN")]
    pub webhook_token: Option<String>,

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
}

#[derive(Debug, Args, Clone)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    /// Content id as the CMS reports it.
    #[arg(value_name = "CONTENT_ID", allow_hyphen_values = true)]
    pub content_id: String,

    /// Lifecycle event to simulate.
    #[arg(long, value_enum, default_value_t = ContentEventArg::Saved)]
    pub event: ContentEventArg,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Content events that can be triggered from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentEventArg {
    Saved,
    Deleted,
    Trashed,
    AttachmentDeleted,
}

impl From<ContentEventArg> for TransitionKind {
    fn from(event: ContentEventArg) -> Self {
        match event {
            ContentEventArg::Saved => TransitionKind::ContentSaved,
            ContentEventArg::Deleted => TransitionKind::ContentDeleted,
            ContentEventArg::Trashed => TransitionKind::ContentTrashed,
            ContentEventArg::AttachmentDeleted => TransitionKind::AttachmentDeleted,
        }
    }
}
