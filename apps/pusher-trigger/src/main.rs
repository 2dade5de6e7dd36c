//! Pusher Trigger - publish events and issue channel tokens from the shell.
//!
//! # Usage
//!
//! ```text
//! pusher-trigger trigger <channel[,channel...]> <event> <data> [--socket-id <id>]
//! pusher-trigger auth <socket_id> <channel> [channel_data_json]
//! pusher-trigger get <path> [name=value...]
//! ```
//!
//! `data` is sent verbatim as the event payload. `auth` prints the JSON token
//! a subscribing client expects; `get` prints the response body.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PUSHER_APP_ID` | *(required)* | Application id |
//! | `PUSHER_KEY` | *(required)* | Application key (`PUSHER_APP_KEY` is accepted) |
//! | `PUSHER_SECRET` | *(required)* | Application secret |
//! | `PUSHER_HOST` | `api.pusherapp.com` | REST API host |
//! | `PUSHER_SCHEME` | `http` | `http` or `https` |
//! | `PUSHER_PORT` | scheme default | REST API port |
//! | `LOG_LEVEL` | `info` | Log level filter (also `--log-level`) |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pusher_client::{ParameterMap, Pusher};
use pusher_core::PusherConfig;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Trigger Pusher events and issue channel authorization tokens.
#[derive(Debug, Parser)]
#[command(name = "pusher-trigger", version, about)]
struct Cli {
    /// Log level filter used when `RUST_LOG` is not set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Command {
    /// Publish an event to one or more channels.
    Trigger {
        /// Comma-separated channel names.
        #[arg(value_parser = parse_channels)]
        channels: ChannelList,
        /// Event name.
        event: String,
        /// Event payload, sent verbatim.
        data: String,
        /// Socket to exclude from delivery.
        #[arg(long)]
        socket_id: Option<String>,
    },
    /// Print a channel authorization token.
    Auth {
        /// Socket id of the subscribing connection.
        socket_id: String,
        /// Channel name.
        channel: String,
        /// Presence member data as JSON.
        #[arg(value_parser = parse_json)]
        channel_data: Option<Value>,
    },
    /// Send a signed GET to an app-scoped path.
    Get {
        /// Path relative to the app, e.g. `/channels`.
        path: String,
        /// Query parameters as `name=value`.
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

/// Non-empty list of channel names.
#[derive(Debug, Clone, PartialEq)]
struct ChannelList(Vec<String>);

fn parse_channels(raw: &str) -> Result<ChannelList, String> {
    let channels: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if channels.is_empty() {
        return Err("at least one channel is required".to_owned());
    }
    Ok(ChannelList(channels))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("not valid JSON: {e}"))
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected name=value, got {raw}"))
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn run(pusher: &Pusher, command: Command) -> Result<()> {
    match command {
        Command::Trigger {
            channels,
            event,
            data,
            socket_id,
        } => {
            let response = pusher
                .trigger(channels.0, &event, data.as_str(), socket_id.as_deref())
                .await
                .context("failed to trigger event")?;
            info!(event = %event, status = %response.status, "Event triggered");
        }
        Command::Auth {
            socket_id,
            channel,
            channel_data,
        } => {
            let token = pusher
                .authorize_channel(&socket_id, &channel, channel_data.as_ref())
                .context("failed to authorize channel")?;
            println!("{}", serde_json::to_string(&token)?);
        }
        Command::Get { path, params } => {
            let params: ParameterMap = params.into_iter().collect();
            let params = (!params.is_empty()).then_some(&params);
            let response = pusher
                .get(&path, params)
                .await
                .with_context(|| format!("GET {path} failed"))?;
            println!("{}", response.body);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = PusherConfig::from_env().context("failed to load Pusher configuration")?;
    let pusher = Pusher::new(config).context("failed to create Pusher client")?;
    run(&pusher, cli.command).await
}
