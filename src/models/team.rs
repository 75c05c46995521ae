//! Team model and team membership endpoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{org_path, NO_QUERY};
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// A team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub slug: String,

    pub name: String,

    #[serde(default)]
    pub has_access: bool,

    #[serde(default)]
    pub is_pending: bool,

    #[serde(default)]
    pub is_member: bool,

    /// Organization role granted to every member of the team.
    #[serde(default)]
    pub org_role: Option<String>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

fn team_path(organization: &str, slug: &str) -> String {
    format!("0/teams/{}/{}/", seg(organization), seg(slug))
}

/// Body for creating or updating a team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[async_trait]
impl Get for Team {
    type Id = (String, String); // (organization, team slug)

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, (organization, slug): (String, String)) -> Result<Self> {
        let response = client.get(&team_path(&organization, &slug)).await?;
        SentryClient::json(response).await
    }
}

#[async_trait]
impl List for Team {
    type Query = String; // Organization slug

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        organization: &String,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        let path = org_path(organization, "teams/");
        client.get_page(&path, NO_QUERY, cursor).await
    }
}

/// Create a team.
#[tracing::instrument(skip(client, request))]
pub async fn create_team(
    client: &SentryClient,
    organization: &str,
    request: &TeamRequest,
) -> Result<Team> {
    let response = client
        .post(&org_path(organization, "teams/"), request)
        .await?;
    SentryClient::json(response).await
}

/// Update a team addressed by its current slug.
#[tracing::instrument(skip(client, request))]
pub async fn update_team(
    client: &SentryClient,
    organization: &str,
    slug: &str,
    request: &TeamRequest,
) -> Result<Team> {
    let response = client.put(&team_path(organization, slug), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_team(client: &SentryClient, organization: &str, slug: &str) -> Result<()> {
    client.delete(&team_path(organization, slug)).await?;
    Ok(())
}

fn team_member_path(organization: &str, member_id: &str, team: &str) -> String {
    org_path(
        organization,
        &format!("members/{}/teams/{}/", seg(member_id), seg(team)),
    )
}

/// Membership of an organization member in a team, as returned when it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    #[serde(default)]
    pub is_active: Option<bool>,

    #[serde(default)]
    pub team_role: Option<String>,
}

/// Add a member to a team.
#[tracing::instrument(skip(client))]
pub async fn add_team_member(
    client: &SentryClient,
    organization: &str,
    member_id: &str,
    team: &str,
) -> Result<()> {
    client
        .post_empty(&team_member_path(organization, member_id, team))
        .await?;
    Ok(())
}

/// Set a member's role within a team.
#[tracing::instrument(skip(client))]
pub async fn set_team_member_role(
    client: &SentryClient,
    organization: &str,
    member_id: &str,
    team: &str,
    role: &str,
) -> Result<TeamMembership> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Body<'a> {
        team_role: &'a str,
    }

    let response = client
        .put(
            &team_member_path(organization, member_id, team),
            &Body { team_role: role },
        )
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn remove_team_member(
    client: &SentryClient,
    organization: &str,
    member_id: &str,
    team: &str,
) -> Result<()> {
    client
        .delete(&team_member_path(organization, member_id, team))
        .await?;
    Ok(())
}
