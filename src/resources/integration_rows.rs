//! Read-modify-write of rows embedded in an organization integration.
//!
//! The Service has no endpoint per row: every change fetches the
//! integration, edits the table inside `configData` and posts the whole
//! configuration back.

use serde_json::Value as Json;

use super::{api_error, found};
use crate::client::SentryClient;
use crate::codec::integration_table::{
    find_new_row, find_row, read_table, remove_row, replace_row, seen_ids, write_table, TableRow,
};
use crate::diagnostics::{client_error, not_found, Diagnostic};
use crate::models::{update_integration_config, OrganizationIntegration};
use crate::traits::Get;

/// One integration whose table is being edited.
pub(super) struct IntegrationTable<'a> {
    pub client: &'a SentryClient,
    pub organization: &'a str,
    pub integration_id: &'a str,
}

impl IntegrationTable<'_> {
    /// `configData` and its decoded rows, or `None` when the integration is gone.
    async fn load<R: TableRow>(&self, action: &'static str) -> Result<Option<(Json, Vec<R>)>, Diagnostic> {
        let Some(integration) = found(
            OrganizationIntegration::get(
                self.client,
                (self.organization.to_string(), self.integration_id.to_string()),
            )
            .await,
            action,
        )?
        else {
            return Ok(None);
        };
        let rows = read_table::<R>(&integration.config_data).map_err(|err| client_error("unmarshal", err))?;
        Ok(Some((integration.config_data, rows)))
    }

    async fn store<R: TableRow>(&self, config_data: &Json, rows: &[R], action: &'static str) -> Result<(), Diagnostic> {
        let config_data = write_table(config_data, rows).map_err(|err| client_error("marshal", err))?;
        update_integration_config(self.client, self.organization, self.integration_id, &config_data)
            .await
            .map_err(api_error(action))
    }

    /// Append `row` and return it as stored, with the id the Service gave it.
    pub async fn insert<R: TableRow>(&self, row: &R) -> Result<R, Diagnostic> {
        let (config_data, mut rows) = self
            .load::<R>("read")
            .await?
            .ok_or_else(|| not_found("integration"))?;
        let seen = seen_ids(&rows);
        rows.push(row.clone());
        self.store(&config_data, &rows, "create").await?;

        let (_, rows) = self
            .load::<R>("read")
            .await?
            .ok_or_else(|| not_found("integration"))?;
        let created = find_new_row(&rows, &seen, row).ok_or_else(|| {
            client_error("create", format!("{} item not found after create", R::TABLE))
        })?;
        tracing::info!(
            integration = %self.integration_id,
            table = R::TABLE,
            row = %created.id(),
            "added integration table row"
        );
        Ok(created.clone())
    }

    /// The row with `id`. `None` when either the integration or the row is gone.
    pub async fn get<R: TableRow>(&self, id: &str) -> Result<Option<R>, Diagnostic> {
        let Some((_, rows)) = self.load::<R>("read").await? else {
            return Ok(None);
        };
        Ok(find_row(&rows, id).cloned())
    }

    /// Overwrite the fields of the row with `id`. `None` when it is gone.
    pub async fn replace<R: TableRow>(&self, id: &str, fields: &R) -> Result<Option<R>, Diagnostic> {
        let Some((config_data, mut rows)) = self.load::<R>("read").await? else {
            return Ok(None);
        };
        if !replace_row(&mut rows, id, fields) {
            return Ok(None);
        }
        self.store(&config_data, &rows, "update").await?;
        self.get(id).await
    }

    /// Drop the row with `id`. Nothing is sent when it is already gone.
    pub async fn remove<R: TableRow>(&self, id: &str) -> Result<(), Diagnostic> {
        let Some((config_data, mut rows)) = self.load::<R>("read").await? else {
            return Ok(());
        };
        if !remove_row(&mut rows, id) {
            tracing::debug!(integration = %self.integration_id, row = %id, "row already removed");
            return Ok(());
        }
        self.store(&config_data, &rows, "delete").await
    }
}
