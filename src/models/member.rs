//! Organization member model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{org_path, Organization, Team, NO_QUERY};
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// A member (or pending invite) of an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Organization role as reported by older Services.
    #[serde(default)]
    pub role: String,

    /// Organization role; takes precedence over `role` when present.
    #[serde(default)]
    pub org_role: Option<String>,

    #[serde(default)]
    pub expired: bool,

    #[serde(default)]
    pub pending: bool,

    /// Explicit per-team roles.
    #[serde(default)]
    pub team_roles: Vec<MemberTeamRole>,

    /// Team roles the member could hold, lowest first.
    #[serde(default)]
    pub team_role_list: Vec<TeamRoleListItem>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamRole {
    pub team_slug: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoleListItem {
    pub id: String,
}

/// The team role `member` effectively holds in `team_slug`.
///
/// An organization role whose minimum team role ranks above the lowest one
/// overrides whatever the member was given in the team; the stronger of the
/// member's own organization role and the team's organization role counts.
/// Otherwise the explicit team role applies, falling back to the lowest team
/// role available to the member.
impl OrganizationMember {
    pub fn organization_role(&self) -> &str {
        self.org_role.as_deref().unwrap_or(&self.role)
    }
}

pub fn effective_team_role(
    organization: &Organization,
    team: &Team,
    member: &OrganizationMember,
    team_slug: &str,
) -> Option<String> {
    let rank = |role: &str| {
        organization
            .org_role_list
            .iter()
            .position(|r| r.id == role)
    };
    let org_role = std::iter::once(member.organization_role())
        .chain(team.org_role.as_deref())
        .filter_map(|role| rank(role).map(|index| (index, role)))
        .max_by_key(|(index, _)| *index)
        .and_then(|(index, _)| organization.org_role_list.get(index));

    if let Some(minimum) = org_role.and_then(|r| r.minimum_team_role.as_deref()) {
        let overrides = organization
            .team_role_list
            .iter()
            .position(|r| r.id == minimum)
            .is_some_and(|index| index > 0);
        if overrides {
            return Some(minimum.to_string());
        }
    }

    member
        .team_roles
        .iter()
        .find(|r| r.team_slug == team_slug)
        .and_then(|r| r.role.clone())
        .or_else(|| member.team_role_list.first().map(|r| r.id.clone()))
}

/// Body for inviting a member.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMemberRequest {
    pub email: String,
    pub role: String,
    pub teams: Vec<String>,
}

/// Body for changing a member's organization role.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMemberRequest {
    pub role: String,
}

fn member_path(organization: &str, member_id: &str) -> String {
    org_path(organization, &format!("members/{}/", seg(member_id)))
}

#[async_trait]
impl Get for OrganizationMember {
    type Id = (String, String); // (organization, member id)

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, (organization, member_id): (String, String)) -> Result<Self> {
        let response = client.get(&member_path(&organization, &member_id)).await?;
        SentryClient::json(response).await
    }
}

#[async_trait]
impl List for OrganizationMember {
    type Query = String; // Organization slug

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        organization: &String,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        client
            .get_page(&org_path(organization, "members/"), NO_QUERY, cursor)
            .await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_member(
    client: &SentryClient,
    organization: &str,
    request: &CreateMemberRequest,
) -> Result<OrganizationMember> {
    let response = client
        .post(&org_path(organization, "members/"), request)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_member(
    client: &SentryClient,
    organization: &str,
    member_id: &str,
    request: &UpdateMemberRequest,
) -> Result<OrganizationMember> {
    let response = client
        .put(&member_path(organization, member_id), request)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_member(client: &SentryClient, organization: &str, member_id: &str) -> Result<()> {
    client.delete(&member_path(organization, member_id)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member() -> OrganizationMember {
        serde_json::from_value(json!({
            "id": "57377908164",
            "email": "sirpenguin@antarcticarocks.com",
            "name": "Sir Penguin",
            "orgRole": "member",
            "expired": false,
            "pending": true,
            "teamRoles": [
                {"teamSlug": "backend", "role": "admin"},
                {"teamSlug": "frontend", "role": null}
            ],
            "teamRoleList": [{"id": "contributor"}, {"id": "admin"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_member() {
        let m = member();
        assert_eq!(m.organization_role(), "member");
        assert!(m.pending);
        assert!(!m.expired);
    }

    #[test]
    fn test_effective_team_role() {
        let organization: Organization = serde_json::from_value(json!({
            "id": "1",
            "slug": "acme",
            "name": "Acme",
            "orgRoleList": [
                {"id": "member", "minimumTeamRole": "contributor"},
                {"id": "admin", "minimumTeamRole": "admin"}
            ],
            "teamRoleList": [{"id": "contributor"}, {"id": "admin"}]
        }))
        .unwrap();
        let team: Team = serde_json::from_value(json!({
            "id": "3", "slug": "backend", "name": "Backend", "orgRole": null
        }))
        .unwrap();

        let m = member();
        assert_eq!(
            effective_team_role(&organization, &team, &m, "backend").as_deref(),
            Some("admin")
        );
        assert_eq!(
            effective_team_role(&organization, &team, &m, "frontend").as_deref(),
            Some("contributor")
        );
    }

    #[test]
    fn test_org_role_overrides_team_role() {
        let organization: Organization = serde_json::from_value(json!({
            "id": "1",
            "slug": "acme",
            "name": "Acme",
            "orgRoleList": [
                {"id": "member", "minimumTeamRole": "contributor"},
                {"id": "manager", "minimumTeamRole": "admin"}
            ],
            "teamRoleList": [{"id": "contributor"}, {"id": "admin"}]
        }))
        .unwrap();
        let team: Team = serde_json::from_value(json!({
            "id": "3", "slug": "frontend", "name": "Frontend", "orgRole": "manager"
        }))
        .unwrap();

        assert_eq!(
            effective_team_role(&organization, &team, &member(), "frontend").as_deref(),
            Some("admin")
        );
    }
}
