use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_sdk::{ConsoleClient, ReplicationDashboard};
use common::{EntityType, HealOptions, HealStatus, TraceCall, TraceFilter, TraceMessage};
use console_core::format::pretty_number;
use console_core::{
    EntitySummary, HealProgress, LookupOutcome, Notification, TraceAction, TraceState,
    render_text, trace_line,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod web;

#[derive(Debug, Parser)]
#[command(name = "console")]
#[command(about = "Site replication console client")]
struct Cli {
    #[arg(long, env = "CONSOLE_SERVER_URL", default_value = "http://127.0.0.1:9090")]
    server_url: String,
    /// Session token from a previous `login`.
    #[arg(long, env = "CONSOLE_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and print the session token.
    Login {
        #[arg(long, env = "CONSOLE_ACCESS_KEY")]
        access_key: String,
        #[arg(long, env = "CONSOLE_SECRET_KEY", hide_env_values = true)]
        secret_key: String,
    },
    /// Synced and failed counts per entity type.
    Status,
    /// Per-site sync status of one bucket, user, group or policy.
    Lookup {
        entity_type: EntityType,
        value: String,
        #[arg(long)]
        json: bool,
    },
    /// Sites taking part in replication.
    Sites,
    Trace(TraceArgs),
    Heal(HealArgs),
    ServeWeb {
        #[arg(long, default_value = "127.0.0.1:9091")]
        bind: String,
    },
}

#[derive(Debug, Args)]
struct TraceArgs {
    /// Comma separated: s3, internal, storage, os. Defaults to all.
    #[arg(long, value_delimiter = ',', value_parser = parse_trace_call)]
    calls: Vec<TraceCall>,
    /// Minimum call duration in milliseconds.
    #[arg(long, default_value_t = 0)]
    threshold: u64,
    #[arg(long)]
    only_errors: bool,
    #[arg(long)]
    status_code: Option<u16>,
    #[arg(long, default_value = "")]
    method: String,
    #[arg(long, default_value = "")]
    func_name: String,
    #[arg(long, default_value = "")]
    path: String,
    /// Stop after this many calls.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
struct HealArgs {
    bucket: String,
    #[arg(long, default_value = "")]
    prefix: String,
    #[arg(long)]
    recursive: bool,
    #[arg(long)]
    force_start: bool,
    #[arg(long)]
    force_stop: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut client = ConsoleClient::new(&cli.server_url);
    if let Some(token) = &cli.token {
        client = client.with_session_token(token);
    }

    match cli.command {
        Commands::Login {
            access_key,
            secret_key,
        } => {
            let token = client
                .login(&access_key, &secret_key)
                .await
                .context("login failed")?;
            println!("{token}");
        }
        Commands::Status => {
            let dashboard = ReplicationDashboard::new(client);
            let mut notifications = dashboard.subscribe_notifications();
            let refreshed = dashboard.refresh().await;
            report_notifications(&mut notifications);
            print_summary(&refreshed.context("console request failed")?.summary);
        }
        Commands::Lookup {
            entity_type,
            value,
            json,
        } => {
            let dashboard = ReplicationDashboard::new(client);
            let mut notifications = dashboard.subscribe_notifications();
            let looked_up = dashboard.lookup(entity_type, &value).await;
            report_notifications(&mut notifications);
            print_lookup(&looked_up.context("console request failed")?.outcome, json)?;
        }
        Commands::Sites => {
            let info = client
                .site_replication_info()
                .await
                .context("failed to fetch site replication info")?;
            if !info.enabled {
                println!("site replication is not enabled");
                return Ok(());
            }
            println!("{} ({} sites)", info.name, info.sites.len());
            for site in &info.sites {
                println!("  {}  {}  {}", site.name, site.deployment_id, site.endpoint);
            }
        }
        Commands::Trace(args) => run_trace(&client, args).await?,
        Commands::Heal(args) => run_heal(&client, args).await?,
        Commands::ServeWeb { bind } => {
            let bind_addr: SocketAddr = bind.parse()?;
            let app = web::router(ReplicationDashboard::new(client));

            println!("web interface at http://{bind_addr}");
            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CONSOLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_trace_call(raw: &str) -> Result<TraceCall, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "s3" => Ok(TraceCall::S3),
        "internal" => Ok(TraceCall::Internal),
        "storage" => Ok(TraceCall::Storage),
        "os" => Ok(TraceCall::Os),
        other => Err(format!("unknown call type {other:?}")),
    }
}

/// Prints raised notifications to stderr.
fn report_notifications(notifications: &mut broadcast::Receiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        eprintln!("{}", notification.message);
        if !notification.detailed.is_empty() {
            eprintln!("  {}", notification.detailed);
        }
    }
}

fn print_summary(summary: &[EntitySummary]) {
    for card in summary {
        println!(
            "{:<10} Synced {:>10}  Failed {:>6}",
            card.label,
            pretty_number(Some(card.synced)),
            pretty_number(Some(card.failed as u64)),
        );
    }
}

fn print_lookup(outcome: &LookupOutcome, json: bool) -> Result<()> {
    if let Some(message) = outcome.not_found_message() {
        println!("{message}");
        return Ok(());
    }
    if let Some(matrix) = outcome.matrix() {
        if json {
            println!("{}", serde_json::to_string_pretty(matrix.rows())?);
        } else {
            print!("{}", render_text(matrix));
        }
    }
    Ok(())
}

async fn run_trace(client: &ConsoleClient, args: TraceArgs) -> Result<()> {
    let filter = TraceFilter {
        calls: args.calls,
        threshold: args.threshold,
        only_errors: args.only_errors,
        status_code: args.status_code,
        method: args.method,
        func_name: args.func_name,
        path: args.path,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = client
        .subscribe_trace(&filter, move |message: TraceMessage| {
            let _ = tx.send(message);
        })
        .await
        .context("failed to open trace stream")?;

    let mut state = TraceState::default();
    state.apply(TraceAction::Started);
    info!(calls = %filter.calls_param(), "trace started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = rx.recv() => match message {
                Some(message) => {
                    println!("{}", trace_line(&message));
                    state.apply(TraceAction::MessageReceived(message));
                    if args.limit.is_some_and(|limit| state.messages.len() >= limit) {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    let reason = subscription.cancel().await;
    state.apply(TraceAction::Stopped);
    info!(received = state.messages.len(), ?reason, "trace stopped");
    Ok(())
}

async fn run_heal(client: &ConsoleClient, args: HealArgs) -> Result<()> {
    let options = HealOptions {
        bucket: args.bucket,
        prefix: args.prefix,
        recursive: args.recursive,
        force_start: args.force_start,
        force_stop: args.force_stop,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = client
        .subscribe_heal(&options, move |status: HealStatus| {
            let _ = tx.send(status);
        })
        .await
        .with_context(|| format!("failed to start heal on bucket={}", options.bucket))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            status = rx.recv() => match status {
                Some(status) => println!("{}", HealProgress::from_status(&status).line()),
                None => break,
            },
        }
    }

    if let client_sdk::CloseReason::Error(err) = subscription.cancel().await {
        warn!(bucket = %options.bucket, error = %err, "heal stream ended with an error");
    }
    Ok(())
}
