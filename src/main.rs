use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portal_gateway::{
    AuthorizationGateway, HttpSessionProbe, NavigationEvent, NavigationType, ProbeState,
    StaticTiming,
    config::{AppConfig, Env},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, mpsc},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replays portal navigations through the authorization gateway.
///
/// The start path is the boot navigation; every further line on stdin is a
/// client-side route change. Each emitted decision is printed to stdout as
/// one JSON line.
#[derive(Parser, Debug)]
#[command(name = "portal-gateway", version, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Navigation-timing entry type at boot (navigate, reload, back_forward,
    /// prerender). Omitted means the timing facility is unavailable.
    #[arg(long)]
    navigation_type: Option<NavigationType>,

    /// Shorthand for `--navigation-type reload`
    #[arg(long, conflicts_with = "navigation_type")]
    reload: bool,

    /// Path the application boots on
    #[arg(default_value = "/")]
    start_path: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify paths against the route rule table without probing
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// main
///
/// Parses arguments, loads configuration, installs logging, then either
/// classifies paths offline or boots a gateway against the configured backend
/// and replays stdin.
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Arguments first, so `--help` never depends on the environment.
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Configuration (fail-fast in production, unless nothing is probed).
    let config = match cli.command {
        Some(Commands::Classify { .. }) => AppConfig::load_offline(),
        None => AppConfig::load(),
    };
    init_tracing(&config);

    let rules = config
        .route_rules()
        .context("failed to resolve the route rule table")?;

    // 2. Offline classification.
    if let Some(Commands::Classify { paths }) = cli.command {
        for path in paths {
            let category = serde_json::to_string(&rules.classify(&path))?;
            println!("{path}\t{category}");
        }
        return Ok(());
    }

    tracing::info!("Gateway starting in {:?} mode", config.env);

    // 3. Gateway assembly.
    let probe = Arc::new(
        HttpSessionProbe::new(&config).context("failed to build the session probe")?,
    ) as ProbeState;
    tracing::info!(endpoint = %config.auth_check_url()?, "session probe ready");
    let gateway = Arc::new(AuthorizationGateway::new(rules, probe, config.splash_delay));

    let timing = if cli.reload {
        StaticTiming::new(NavigationType::Reload)
    } else {
        StaticTiming::from(cli.navigation_type)
    };
    let boot = NavigationEvent::boot(cli.start_path, &timing);

    // 4. Decision printer. Ends once the gateway (and its sender) is dropped.
    let mut decisions = gateway.subscribe_all();
    let printer = tokio::spawn(async move {
        loop {
            match decisions.recv().await {
                Ok(decision) => match serde_json::to_string(&decision) {
                    Ok(line) => println!("{line}"),
                    Err(err) => tracing::error!(error = %err, "could not serialize decision"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "decision printer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 5. Replay stdin as client-side navigations.
    let (events, receiver) = mpsc::channel(32);
    let driver = tokio::spawn(gateway.run(boot, receiver));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        if events.send(NavigationEvent::push(path)).await.is_err() {
            break;
        }
    }
    drop(events);

    driver.await.context("gateway driver panicked")?;
    printer.await.context("decision printer panicked")?;
    Ok(())
}

// Local: pretty output for humans. Production: JSON for log aggregation.
// Both go to stderr so stdout carries only decisions.
fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_gateway=debug,reqwest=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }
}
