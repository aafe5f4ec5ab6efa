// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `esmd`: process bootstrap for the Edge Stack Manager (`spec.md`
//! §1's "process bootstrap/configuration" out-of-scope collaborator,
//! supplied here as the ambient stack `SPEC_FULL.md` §12-§15 calls
//! for).
//!
//! Staged startup mirroring the teacher's `lifecycle::startup`: load
//! config, construct the bound `Deployer` for the configured
//! `EngineType`, wire `ManifestStore`/`ControlPlaneClient`, build one
//! `Engine`, then run the Worker Loop and the poll-loop driver side by
//! side until a shutdown signal arrives.

mod config;
mod error;
mod poll_loop;

use clap::Parser;
use config::{Cli, Config, LogFormat};
use error::DaemonError;
use esm_adapters::{Deployer, DockerStandaloneDeployer, DockerSwarmDeployer, KubernetesDeployer, NomadDeployer};
use esm_core::{EngineType, Registry};
use esm_engine::{Engine, Intake, Reconciler, StatusReporter, TokioSleeper};
use esm_storage::ManifestStore;
use esm_wire::{ControlPlaneClient, HttpControlPlaneClient};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The tracing subscriber may not have been installed yet if
            // config loading itself failed; eprintln guarantees the
            // operator sees the cause either way.
            eprintln!("esmd: fatal: {err}");
            error!(error = %err, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), DaemonError> {
    let config = Config::load(&cli)?;
    init_tracing(config.log_format);

    info!(
        engine_type = %config.engine_type,
        state_dir = %config.state_dir.display(),
        control_plane_url = %config.control_plane_url,
        "esmd starting"
    );

    std::fs::create_dir_all(&config.state_dir).map_err(|source| DaemonError::BadConfig {
        var: "ESM_STATE_DIR",
        value: format!("{}: {source}", config.state_dir.display()),
    })?;

    let deployer = build_deployer(config.engine_type).await?;
    let manifest_store = Arc::new(ManifestStore::new(config.state_dir.clone()));
    let control_plane: Arc<dyn ControlPlaneClient> =
        Arc::new(HttpControlPlaneClient::new(config.control_plane_url.clone(), config.edge_key.clone()));

    let registry = Registry::new();
    let status_reporter = StatusReporter::new(Arc::clone(&control_plane));
    let reconciler = Reconciler::new(
        registry.clone(),
        deployer,
        Arc::clone(&manifest_store),
        StatusReporter::new(Arc::clone(&control_plane)),
        config.host_filesystem_path.clone(),
        config.compose_prefix.clone(),
    );
    let intake = Intake::new(
        registry.clone(),
        Arc::clone(&control_plane),
        manifest_store,
        status_reporter,
        config.engine_type,
    );

    let engine = Arc::new(Engine::new(registry, TokioSleeper::new(), reconciler, intake));

    // First poll runs before the worker starts, so there is something
    // to reconcile on the Worker Loop's very first pass (not required
    // for correctness, but avoids an idle-interval sleep on a cold
    // start with stacks already waiting at the control plane).
    match control_plane.poll_desired_state().await {
        Ok(desired) => {
            if let Err(err) = engine.poll(desired).await {
                error!(error = %err, "initial poll intake failed");
            }
        }
        Err(err) => return Err(DaemonError::InitialPoll(err)),
    }

    let stop = Arc::new(AtomicBool::new(false));

    let worker_engine = Arc::clone(&engine);
    let worker_handle = tokio::spawn(async move { worker_engine.run().await });

    let poll_handle = tokio::spawn(poll_loop::run(
        Arc::clone(&engine),
        Arc::clone(&control_plane),
        config.poll_interval,
        Arc::clone(&stop),
    ));

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining");
    engine.stop();
    stop.store(true, Ordering::Release);

    let drain = tokio::time::timeout(config.drain_timeout, worker_handle);
    if drain.await.is_err() {
        error!(timeout = ?config.drain_timeout, "worker loop did not drain in time");
    }
    poll_handle.abort();

    info!("esmd stopped");
    Ok(())
}

async fn build_deployer(engine_type: EngineType) -> Result<Arc<dyn Deployer>, DaemonError> {
    let deployer: Arc<dyn Deployer> = match engine_type {
        EngineType::DockerStandalone => {
            Arc::new(DockerStandaloneDeployer::new().map_err(|source| DaemonError::DeployerInit { engine_type, source })?)
        }
        EngineType::DockerSwarm => {
            Arc::new(DockerSwarmDeployer::new().map_err(|source| DaemonError::DeployerInit { engine_type, source })?)
        }
        EngineType::Kubernetes => Arc::new(
            KubernetesDeployer::new().await.map_err(|source| DaemonError::DeployerInit { engine_type, source })?,
        ),
        EngineType::Nomad => {
            let base_url = std::env::var("ESM_NOMAD_ADDR").unwrap_or_else(|_| "http://127.0.0.1:4646".to_string());
            Arc::new(NomadDeployer::new(base_url))
        }
    };
    Ok(deployer)
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

/// Graceful shutdown (`SPEC_FULL.md` §15): `Ctrl+C` everywhere, plus
/// `SIGTERM` on Unix where process supervisors use it.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            sig.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
