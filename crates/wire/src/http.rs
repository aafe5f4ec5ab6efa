// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed [`ControlPlaneClient`], talking to the control plane's
//! REST surface with a bearer credential (`esm-daemon`'s `ESM_EDGE_KEY`).

use crate::client::{ControlPlaneClient, StatusReport};
use crate::error::ControlPlaneError;
use crate::payload::{DesiredState, StackPayload};
use async_trait::async_trait;
use esm_core::{StackId, Version};
use serde_json::json;

pub struct HttpControlPlaneClient {
    http: reqwest::Client,
    base_url: String,
    edge_key: String,
}

impl HttpControlPlaneClient {
    pub fn new(base_url: impl Into<String>, edge_key: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), edge_key: edge_key.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ControlPlaneClient for HttpControlPlaneClient {
    async fn get_edge_stack_config(&self, id: StackId, version: Version) -> Result<StackPayload, ControlPlaneError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/edge_stacks/{}/config", id.get())))
            .bearer_auth(&self.edge_key)
            .query(&[("version", version.get())])
            .send()
            .await
            .map_err(|source| ControlPlaneError::Transport { id, source })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ControlPlaneError::Status { id, status, body });
        }

        let bytes = resp.bytes().await.map_err(|source| ControlPlaneError::Transport { id, source })?;
        serde_json::from_slice(&bytes).map_err(|source| ControlPlaneError::Decode { id, source })
    }

    async fn set_edge_stack_status(&self, report: StatusReport) -> Result<(), ControlPlaneError> {
        let id = report.id;
        let resp = self
            .http
            .post(self.url(&format!("/api/edge_stacks/{}/status", id.get())))
            .bearer_auth(&self.edge_key)
            .json(&json!({
                "status": report.kind.to_string(),
                "rollbackTo": report.rollback_to.as_deref(),
                "message": report.message,
            }))
            .send()
            .await
            .map_err(|source| ControlPlaneError::Transport { id, source })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(ControlPlaneError::Status { id, status, body })
        }
    }

    async fn poll_desired_state(&self) -> Result<DesiredState, ControlPlaneError> {
        let resp = self
            .http
            .get(self.url("/api/edge_stacks"))
            .bearer_auth(&self.edge_key)
            .send()
            .await
            .map_err(|source| ControlPlaneError::Transport { id: StackId::new(0), source })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ControlPlaneError::Status { id: StackId::new(0), status, body });
        }

        let bytes = resp.bytes().await.map_err(|source| ControlPlaneError::Transport { id: StackId::new(0), source })?;
        serde_json::from_slice(&bytes).map_err(|source| ControlPlaneError::Decode { id: StackId::new(0), source })
    }
}
