//! Table-service backend.
//!
//! Wire format: `GET/POST /v0/{base}/{table}` and `PATCH
//! /v0/{base}/{table}/{id}` with a bearer-token auth header. Request and
//! response bodies are `{"fields": {...}}` objects; list responses are
//! `{"records": [...]}`. The owner filter is an equality formula passed as
//! the `filterByFormula` query parameter.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tally_config::TableSettings;
use tally_types::{Fields, Record, RecordId, Scope, UserId};

use crate::{ClientError, error_for_status, http_client};

#[derive(Debug, Deserialize)]
struct ApiRecord {
    id: String,
    #[serde(rename = "createdTime")]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    fields: Fields,
}

impl From<ApiRecord> for Record {
    fn from(api: ApiRecord) -> Self {
        Record::new(RecordId::new(api.id), api.created_time, api.fields)
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<ApiRecord>,
}

fn table_url(settings: &TableSettings, scope: &Scope) -> String {
    format!(
        "{}/v0/{}/{}",
        settings.api_url.trim_end_matches('/'),
        scope.base(),
        scope.table()
    )
}

/// Equality formula for the owner filter, e.g. `{user_id} = 'u1'`.
fn owner_formula(owner: &UserId) -> String {
    let escaped = owner.as_str().replace('\'', "\\'");
    format!("{{{}}} = '{}'", tally_types::task::fields::OWNER, escaped)
}

fn authorized(request: reqwest::RequestBuilder, settings: &TableSettings) -> reqwest::RequestBuilder {
    request.bearer_auth(settings.api_key.expose_secret())
}

pub(crate) async fn list(
    settings: &TableSettings,
    scope: &Scope,
    owner: Option<&UserId>,
) -> Result<Vec<Record>, ClientError> {
    let mut request = authorized(http_client().get(table_url(settings, scope)), settings);
    if let Some(owner) = owner {
        request = request.query(&[("filterByFormula", owner_formula(owner))]);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(error_for_status(response, None).await);
    }

    let list: ListResponse = response.json().await?;
    tracing::debug!(scope = %scope, count = list.records.len(), "Listed table records");
    Ok(list.records.into_iter().map(Record::from).collect())
}

pub(crate) async fn create(
    settings: &TableSettings,
    scope: &Scope,
    fields: Fields,
) -> Result<Record, ClientError> {
    let body = serde_json::json!({ "fields": fields });
    let response = authorized(http_client().post(table_url(settings, scope)), settings)
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_for_status(response, None).await);
    }

    let record: ApiRecord = response.json().await?;
    tracing::debug!(scope = %scope, id = %record.id, "Created table record");
    Ok(record.into())
}

pub(crate) async fn update(
    settings: &TableSettings,
    scope: &Scope,
    id: &RecordId,
    fields: Fields,
) -> Result<Record, ClientError> {
    let url = format!("{}/{}", table_url(settings, scope), id);
    let body = serde_json::json!({ "fields": fields });
    let response = authorized(http_client().patch(url), settings)
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_for_status(response, Some(id)).await);
    }

    let record: ApiRecord = response.json().await?;
    tracing::debug!(scope = %scope, id = %record.id, "Updated table record");
    Ok(record.into())
}

#[cfg(test)]
mod tests {
    use super::owner_formula;
    use tally_types::UserId;

    #[test]
    fn owner_formula_is_braced_equality() {
        assert_eq!(owner_formula(&UserId::new("u1")), "{user_id} = 'u1'");
    }

    #[test]
    fn owner_formula_escapes_quotes() {
        assert_eq!(
            owner_formula(&UserId::new("o'brien")),
            "{user_id} = 'o\\'brien'"
        );
    }
}
