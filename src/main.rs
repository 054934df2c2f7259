use std::sync::Arc;

use tokio::sync::watch;

use orderflow::adapters::{
    FileSessionStorage, InMemoryCatalog, JsonLinesTransport, RecordingOrderGateway,
};
use orderflow::application::{
    HandleEventHandler, SessionStore, SweepSessionsConfig, SweepSessionsHandler,
};
use orderflow::config::AppConfig;
use orderflow::domain::compaction::SessionOptimizer;
use orderflow::domain::conversation::SceneMachine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);
    tracing::info!(
        environment = ?config.runtime.environment,
        path = %config.storage.path.display(),
        "Starting orderflow"
    );

    let limits = config.compaction.limits();
    let store = Arc::new(SessionStore::new(
        Arc::new(FileSessionStorage::new(&config.storage.path)),
        SessionOptimizer::new(limits.clone()),
        config.storage.store_config(config.runtime.default_language),
    ));

    let events = Arc::new(HandleEventHandler::new(
        Arc::clone(&store),
        Arc::new(InMemoryCatalog::demo()),
        Arc::new(RecordingOrderGateway::new()),
        SceneMachine::new(config.runtime.default_language, limits.max_history_depth),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SweepSessionsHandler::new(
        Arc::clone(&store),
        SweepSessionsConfig {
            interval: config.compaction.sweep_interval(),
        },
    );
    let sweeper_task = {
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { sweeper.run(shutdown).await })
    };

    // Events arrive as JSON lines on stdin; replies go to stdout.
    let transport = JsonLinesTransport::new(events, Arc::clone(&store));
    let transport_task = tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        transport.serve(stdin, tokio::io::stdout(), shutdown_rx).await
    });

    tracing::info!("orderflow ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    shutdown_tx.send(true)?;
    sweeper_task.await?;
    if let Err(e) = transport_task.await? {
        tracing::error!(error = %e, "Transport failed");
    }

    // A pending stdin read cannot be cancelled and would hold the runtime open.
    std::process::exit(0)
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.runtime.log_level));

    // stdout carries transport replies
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}
