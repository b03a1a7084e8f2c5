//! Main entry point for the Ikon pass availability watcher.
//! Wires the account session, API client, SMS backend, and polling loop
//! together from environment configuration and runs until interrupted.

mod settings;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pass_scan::{
    IkonClient, Notifier, SessionConfig, SessionManager, Watcher, WatcherConfig,
};
use settings::Settings;
use sms_services::create_sms_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    info!(
        "Starting pass watcher ({} desired dates, {} recipients, polling every {:?})",
        settings.desired_dates.len(),
        settings.recipients.len(),
        settings.poll_interval
    );

    let session_config =
        SessionConfig::new(settings.login_email.clone(), settings.login_password.clone());
    let session_manager =
        Arc::new(SessionManager::new(session_config).context("Failed to create session manager")?);

    let client = Arc::new(IkonClient::new(session_manager, settings.fetch_url.clone()));

    let sms_service = create_sms_service(settings.sms.clone())
        .await
        .context("Failed to initialize SMS service")?;
    let notifier = Notifier::new(sms_service, settings.recipients.clone());

    let watcher = Watcher::new(
        client,
        notifier,
        WatcherConfig {
            desired_dates: settings.desired_dates.clone(),
            poll_interval: settings.poll_interval,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher_handle = tokio::spawn(watcher.run(shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    shutdown_tx.send(true).ok();
    watcher_handle.await.context("Watcher task panicked")?;

    Ok(())
}
