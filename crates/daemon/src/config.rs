// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration (`SPEC_FULL.md` §12), read from environment
//! variables the same way the teacher's `env.rs` does, with `clap`
//! flags layered on top to override them — mirroring the precedence
//! the teacher's CLI gives its own flags over its env vars.

use esm_core::EngineType;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DaemonError;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "esmd", about = "Edge Stack Manager reconciliation daemon")]
pub struct Cli {
    /// Overrides `ESM_STATE_DIR`.
    #[arg(long, env = "ESM_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Overrides `ESM_ENGINE_TYPE` (`docker-standalone` | `docker-swarm` | `kubernetes` | `nomad`).
    #[arg(long, env = "ESM_ENGINE_TYPE")]
    pub engine_type: Option<String>,

    /// Overrides `ESM_CONTROL_PLANE_URL`.
    #[arg(long, env = "ESM_CONTROL_PLANE_URL")]
    pub control_plane_url: Option<String>,

    /// `json` or `pretty` (default `pretty`).
    #[arg(long, default_value = "pretty")]
    pub log_format: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub control_plane_url: String,
    pub edge_key: String,
    pub engine_type: EngineType,
    pub poll_interval: Duration,
    pub drain_timeout: Duration,
    pub log_format: LogFormat,
    /// `<filesystemPath>` in `spec.md` §6's `SupportRelativePath` layout.
    pub host_filesystem_path: PathBuf,
    /// `<composePrefix>` in the same layout (default `"compose"`).
    pub compose_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Resolve configuration from the process environment, then apply
    /// any `clap` flag overrides (`SPEC_FULL.md` §12).
    pub fn load(cli: &Cli) -> Result<Self, DaemonError> {
        let state_dir = cli
            .state_dir
            .clone()
            .or_else(|| std::env::var("ESM_STATE_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(default_state_dir);

        let control_plane_url = cli
            .control_plane_url
            .clone()
            .or_else(|| std::env::var("ESM_CONTROL_PLANE_URL").ok())
            .ok_or(DaemonError::MissingConfig { var: "ESM_CONTROL_PLANE_URL" })?;

        let edge_key = std::env::var("ESM_EDGE_KEY").map_err(|_| DaemonError::MissingConfig { var: "ESM_EDGE_KEY" })?;

        let engine_type_raw = cli
            .engine_type
            .clone()
            .or_else(|| std::env::var("ESM_ENGINE_TYPE").ok())
            .ok_or(DaemonError::MissingConfig { var: "ESM_ENGINE_TYPE" })?;
        let engine_type = parse_engine_type(&engine_type_raw)?;

        let poll_interval = duration_ms_var("ESM_POLL_INTERVAL_MS", 5_000)?;
        let drain_timeout = duration_ms_var("ESM_DRAIN_TIMEOUT_MS", 5_000)?;

        let log_format = match cli.log_format.as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => return Err(DaemonError::BadConfig { var: "--log-format", value: other.to_string() }),
        };

        let host_filesystem_path = std::env::var("ESM_HOST_FILESYSTEM_PATH").ok().map(PathBuf::from).unwrap_or_else(|| state_dir.join("host"));
        let compose_prefix = std::env::var("ESM_COMPOSE_PREFIX").unwrap_or_else(|_| "compose".to_string());

        Ok(Self {
            state_dir,
            control_plane_url,
            edge_key,
            engine_type,
            poll_interval,
            drain_timeout,
            log_format,
            host_filesystem_path,
            compose_prefix,
        })
    }
}

fn default_state_dir() -> PathBuf {
    std::env::var("HOME").map(|home| PathBuf::from(home).join(".local/state/esm")).unwrap_or_else(|_| PathBuf::from("/var/lib/esm"))
}

fn parse_engine_type(raw: &str) -> Result<EngineType, DaemonError> {
    match raw {
        "docker-standalone" => Ok(EngineType::DockerStandalone),
        "docker-swarm" => Ok(EngineType::DockerSwarm),
        "kubernetes" => Ok(EngineType::Kubernetes),
        "nomad" => Ok(EngineType::Nomad),
        other => Err(DaemonError::BadConfig { var: "ESM_ENGINE_TYPE", value: other.to_string() }),
    }
}

fn duration_ms_var(var: &'static str, default_ms: u64) -> Result<Duration, DaemonError> {
    match std::env::var(var) {
        Ok(raw) => raw.parse::<u64>().map(Duration::from_millis).map_err(|_| DaemonError::BadConfig { var, value: raw }),
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
