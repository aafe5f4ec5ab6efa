// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! esm-adapters: the `Deployer` trait and one implementation per
//! supported engine (`spec.md` §6, §9).
//!
//! The reconciliation engine (`esm-engine`) only ever depends on the
//! [`Deployer`] trait; everything engine-specific — shelling out to
//! `docker compose`, talking to the Kubernetes API, calling Nomad's
//! HTTP API — lives behind it in this crate.

pub mod deployer;
pub mod docker_standalone;
pub mod docker_swarm;
pub mod kubernetes;
pub mod nomad;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
pub use docker_standalone::DockerStandaloneDeployer;
pub use docker_swarm::DockerSwarmDeployer;
pub use kubernetes::KubernetesDeployer;
pub use nomad::NomadDeployer;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCall, FakeDeployer};
