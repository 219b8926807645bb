//! Echo Bot Example
//!
//! Builds a GLaDOS host with one extension, `echo`, and dispatches a single
//! request described on the command line.
//!
//! Slash, Events, Interaction and Menu requests must be signed: pass
//! `--signing-secret`, or `--insecure` to accept them unsigned.
//!
//! Without `--config` the host runs on a built-in configuration with one bot
//! named after `--bot` and the echo extension enabled for it. With a config
//! file, enable the extension yourself:
//!
//! ```toml
//! [glados]
//! import_bots = true
//!
//! [bots.acme]
//! token = { env_var = "ACME_TOKEN" }
//! signing_secret = { env_var = "ACME_SIGNING_SECRET" }
//!
//! [extensions.echo]
//! enabled = true
//! bot = { name = "acme" }
//! settings = { prefix = "🔁 " }
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- send-message echo '{"text": "hello"}'
//! cargo run --package echo-bot -- --insecure slash echo '{"text": "hello"}'
//! cargo run --package echo-bot -- --signing-secret s3cret events - '{"event": {"type": "message", "text": "hi"}}'
//! cargo run --package echo-bot -- --signing-secret s3cret interaction - \
//!     '{"actions": [{"action_id": "echo_button", "value": "clicked"}]}'
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use glados::prelude::*;
use glados::runtime::SigningSecretVerifier;
use glados::runtime::config::{BotConfig, ExtensionConfig, LogLevel, SecretSource};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

// ============================================================================
// The echo extension
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EchoSettings {
    prefix: String,
}

/// `/echo <text>` - replies with the text.
async fn echo_slash(request: Request) -> HandlerResult {
    let text = request.payload().get("text").as_str().unwrap_or_default();
    Ok(json!({ "response_type": "in_channel", "text": text }))
}

/// `/help` - lists the commands.
async fn help_slash(_request: Request) -> HandlerResult {
    Ok(json!({ "text": "/echo <text>, /help" }))
}

/// Echoes message events back; ignores messages without text.
async fn echo_message(request: Request) -> HandlerResult {
    let event = request.payload().get("event");
    match event.get("text").as_str() {
        Some(text) => Ok(json!({ "channel": event.get("channel").as_str(), "text": text })),
        None => Ok(Value::Null),
    }
}

/// Button clicks reply with the button's value.
async fn echo_button(request: Request) -> HandlerResult {
    let value = request
        .payload()
        .get("actions")
        .at(0)
        .get("value")
        .as_str()
        .unwrap_or("(no value)")
        .to_string();
    Ok(json!({ "text": value, "response_url": request.response_url() }))
}

fn create_echo(ctx: ExtensionContext) -> RuntimeResult<Extension> {
    let settings: EchoSettings = ctx.get_config().unwrap_or_default();
    let prefix = settings.prefix;

    let mut extension = ctx.extension();
    extension.add_route(RouteType::Slash, "echo", echo_slash)?;
    extension.add_route(RouteType::Slash, "help", help_slash)?;
    extension.add_route(RouteType::Events, EventRoute::Message, echo_message)?;
    extension.add_route(RouteType::Interaction, "echo_button", echo_button)?;
    extension.add_route(RouteType::SendMessage, "echo", move |request: Request| {
        let prefix = prefix.clone();
        async move {
            let text = request.payload().get("text").as_str().unwrap_or_default();
            Ok::<Value, BoxError>(json!({ "text": format!("{prefix}{text}") }))
        }
    })?;
    Ok(extension)
}

#[distributed_slice(EXTENSIONS)]
#[linkme(crate = glados::linkme)]
static ECHO: ExtensionDescriptor = ExtensionDescriptor::new("echo", create_echo);

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "echo-bot", about = "Dispatch one request through a GLaDOS host")]
struct Cli {
    /// Configuration file (TOML or YAML). Uses a built-in demo config if unset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bot the request is addressed to.
    #[arg(short, long, default_value = "demo")]
    bot: String,

    /// Signing secret for the built-in bot; the request is signed with it.
    #[arg(long)]
    signing_secret: Option<String>,

    /// Accept unsigned requests for the built-in bot when no secret is given.
    #[arg(long)]
    insecure: bool,

    /// Log level for the built-in config.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Route type: send-message, response, callback, slash, events,
    /// interaction or menu.
    route_type: RouteType,

    /// Route key; `-` to derive it from the payload.
    key: String,

    /// JSON payload.
    #[arg(default_value = "{}")]
    payload: String,
}

fn demo_config(cli: &Cli) -> Result<GladosConfig> {
    let mut config = GladosConfig::default();
    config.logging.level = serde_json::from_value::<LogLevel>(json!(cli.log_level))
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;
    config.host.import_bots = true;
    config.bots = BTreeMap::from([(
        cli.bot.clone(),
        BotConfig {
            token: SecretSource::Literal("xoxb-demo".into()),
            signing_secret: cli.signing_secret.clone().map(SecretSource::Literal),
            insecure_skip_verification: cli.insecure,
        },
    )]);

    let mut echo = ExtensionConfig {
        enabled: true,
        ..Default::default()
    };
    echo.bot.name = Some(cli.bot.clone());
    config.extensions.insert("echo".into(), echo);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let builder = match &cli.config {
        Some(path) => Glados::builder().config_file(path),
        None => Glados::builder().config(demo_config(&cli)?),
    };
    let glados = builder.build()?;
    info!(bots = ?glados.bots().names(), extensions = ?glados.extensions(), "Host ready");

    let payload = Payload::from_json_str(&cli.payload).context("payload is not JSON")?;
    let mut request = Request::builder(cli.route_type)
        .bot(cli.bot.as_str())
        .payload(payload);
    if cli.key != "-" {
        request = request.key(cli.key.as_str());
    }
    if let Some(secret) = &cli.signing_secret {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)?
            .as_secs()
            .to_string();
        let signature = SigningSecretVerifier::new(secret.as_str()).sign(&timestamp, &cli.payload);
        request = request.verification(VerificationEnvelope::new(
            cli.payload.as_str(),
            Some(timestamp),
            Some(signature),
        ));
    }

    match glados.request(request.build()).await {
        Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
        Err(DispatchError::NotFound(e)) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
