//! callback-logging CLI
//!
//! Offline tooling around the logging pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     request.json ──▶ LoggingContext::pre_call ──▶ metadata["raw_request"]
//!                               │
//!                               ▼
//!                      CallbackDispatcher ──▶ adapters (langfuse, tracing)
//!                               │                   │
//!                               ▼                   ▼
//!                      DispatchReport (stdout)   logs (stderr, redacted)
//!
//!     Cross-cutting: config (TOML + validation), redaction, metrics
//! ```
//!
//! # Commands
//! - `redact`: scrub stdin to stdout
//! - `check-config <path>`: load and validate a config file
//! - `replay <config> <request.json>`: run one synthetic call through the pipeline
//! - `watch <config>`: keep a live config and adapter set, reloading on file change

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use callback_logging::callbacks::{CallbackDispatcher, CallbackEvent};
use callback_logging::config::{
    build_redactor, load_config, ConfigWatcher, LoggingConfig, RuntimeConfig,
};
use callback_logging::integrations::build_adapters;
use callback_logging::logging::{AdditionalArgs, CallType, Message};
use callback_logging::metadata::{LitellmParams, MetadataHandle};
use callback_logging::observability::{logging::init_logging, metrics::init_metrics};

#[derive(Parser)]
#[command(name = "callback-logging")]
#[command(about = "Redaction and callback logging tools for LLM API calls", long_about = None)]
struct Cli {
    /// Config file used for logging setup (defaults apply when omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact secrets from stdin and write the result to stdout
    Redact,
    /// Load and validate a configuration file
    CheckConfig { path: PathBuf },
    /// Run a recorded request through pre_call and dispatch
    Replay { config: PathBuf, request: PathBuf },
    /// Watch a configuration file and apply changes until interrupted
    Watch { config: PathBuf },
}

/// A recorded call, as read by `replay`.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ReplayRequest {
    model: String,
    messages: Vec<Message>,
    call_type: CallType,
    api_key: Option<String>,
    additional_args: AdditionalArgs,
    metadata: Option<Map<String, Value>>,
    response: Option<Value>,
    error: Option<String>,
}

impl Default for ReplayRequest {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            messages: Vec::new(),
            call_type: CallType::Completion,
            api_key: None,
            additional_args: AdditionalArgs::default(),
            metadata: None,
            response: None,
            error: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match (&cli.command, &cli.config) {
        (Commands::Replay { config, .. }, _) | (Commands::Watch { config }, _) => {
            load_config(config)?
        }
        (_, Some(path)) => load_config(path)?,
        (_, None) => LoggingConfig::default(),
    };
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Redact => redact_stdin(&config)?,
        Commands::CheckConfig { path } => check_config(&path)?,
        Commands::Replay { request, .. } => replay(config, &request).await?,
        Commands::Watch { config: path } => watch(config, &path).await?,
    }

    Ok(())
}

fn redact_stdin(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let redactor = build_redactor(&config.redaction)?;
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    std::io::stdout().write_all(redactor.redact(&input).as_bytes())?;
    Ok(())
}

fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    build_adapters(&config, Arc::new(build_redactor(&config.redaction)?))?;
    tracing::info!(path = %path.display(), "Configuration is valid");
    println!("ok: {}", path.display());
    Ok(())
}

async fn replay(config: LoggingConfig, request: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let request: ReplayRequest = serde_json::from_str(&std::fs::read_to_string(request)?)?;
    let runtime = Arc::new(RuntimeConfig::new(config)?);

    let dispatcher =
        CallbackDispatcher::new(runtime.callback_timeout()).with_runtime(Arc::clone(&runtime));
    dispatcher.replace_all(build_adapters(&runtime.load(), runtime.redactor())?);

    let mut context = runtime
        .new_context(request.model.clone(), request.messages, request.call_type)
        .with_start_time(Some(Utc::now()))
        .with_litellm_params(LitellmParams {
            metadata: request.metadata.map(MetadataHandle::from_map),
            api_base: request.additional_args.api_base.clone(),
            ..Default::default()
        });

    let input = serde_json::to_value(&context.messages)?;
    context.pre_call(
        input,
        request.api_key.as_deref(),
        &request.model,
        &request.additional_args,
    );
    let pre_call = dispatcher
        .dispatch(CallbackEvent::PreCall, &context, None)
        .await;

    let completion = match request.error {
        Some(error) => context.failure(&dispatcher, &error).await,
        None => context.success(&dispatcher, request.response).await,
    };

    let report = json!({
        "call_id": context.call_id,
        "metadata": context.metadata().map(|m| Value::Object(m.snapshot())),
        "dispatch": [pre_call, completion],
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn watch(config: LoggingConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let runtime = Arc::new(RuntimeConfig::new(config)?);
    let dispatcher =
        CallbackDispatcher::new(runtime.callback_timeout()).with_runtime(Arc::clone(&runtime));
    dispatcher.replace_all(build_adapters(&runtime.load(), runtime.redactor())?);

    let (watcher, mut reloaded) = ConfigWatcher::new(path, Arc::clone(&runtime));
    let _watcher = watcher.run()?;
    tracing::info!(
        path = %path.display(),
        adapters = ?dispatcher.adapter_names(),
        "Watching configuration"
    );

    loop {
        tokio::select! {
            Some(next) = reloaded.recv() => {
                match build_adapters(&next, runtime.redactor()) {
                    Ok(adapters) => dispatcher.replace_all(adapters),
                    Err(e) => {
                        tracing::error!(error = %e, "Keeping previous adapters after reload");
                    }
                }
                tracing::info!(
                    adapters = ?dispatcher.adapter_names(),
                    timeout_ms = dispatcher.timeout().as_millis() as u64,
                    log_raw_request_response = next.policy.log_raw_request_response,
                    "Configuration reloaded"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down watcher");
                break;
            }
        }
    }

    Ok(())
}
