//! Spike protection switches.
//!
//! Spike protection has no entity of its own: it is enabled or disabled
//! for a batch of projects and read back through the project option
//! [`OPTION_SPIKE_PROTECTION_DISABLED`](super::OPTION_SPIKE_PROTECTION_DISABLED).

use serde::Serialize;

use super::org_path;
use crate::client::SentryClient;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpikeProtectionRequest {
    /// Project slugs.
    pub projects: Vec<String>,
}

impl SpikeProtectionRequest {
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
        }
    }
}

#[tracing::instrument(skip(client))]
pub async fn enable_spike_protection(
    client: &SentryClient,
    organization: &str,
    request: &SpikeProtectionRequest,
) -> Result<()> {
    client
        .post(&org_path(organization, "spike-protections/"), request)
        .await?;
    Ok(())
}

#[tracing::instrument(skip(client))]
pub async fn disable_spike_protection(
    client: &SentryClient,
    organization: &str,
    request: &SpikeProtectionRequest,
) -> Result<()> {
    client
        .delete_with_body(&org_path(organization, "spike-protections/"), request)
        .await?;
    Ok(())
}

/// Enable or disable in one call.
pub async fn set_spike_protection(
    client: &SentryClient,
    organization: &str,
    request: &SpikeProtectionRequest,
    enabled: bool,
) -> Result<()> {
    if enabled {
        enable_spike_protection(client, organization, request).await
    } else {
        disable_spike_protection(client, organization, request).await
    }
}
