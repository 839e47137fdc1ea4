//! Document-database backend.
//!
//! Firestore-style REST: documents live under
//! `/v1/projects/{project}/databases/(default)/documents/{collection}`,
//! field values travel in typed envelopes (`stringValue`, `doubleValue`,
//! ...), the owner filter is a `:runQuery` structured query, and updates
//! are `PATCH` with an `updateMask` naming the patched fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_config::DocumentSettings;
use tally_types::{Fields, Record, RecordId, Scope, UserId};

use crate::{ClientError, error_for_status, http_client};

#[derive(Debug, Deserialize)]
struct ApiDocument {
    name: String,
    #[serde(rename = "createTime")]
    create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<ApiDocument>,
}

/// One entry in a `:runQuery` response stream. Entries without a document
/// (read-time markers) are skipped.
#[derive(Debug, Deserialize)]
struct QueryEntry {
    document: Option<ApiDocument>,
}

/// `projects/{p}/databases/(default)/documents/{collection}/{id}` -> `{id}`
fn document_id(name: &str) -> RecordId {
    RecordId::new(name.rsplit('/').next().unwrap_or(name))
}

fn decode_document(doc: ApiDocument) -> Record {
    let mut fields = Fields::new();
    for (name, envelope) in doc.fields {
        fields.insert(name, decode_value(&envelope));
    }
    Record::new(document_id(&doc.name), doc.create_time, fields)
}

/// Unwrap a typed value envelope into plain JSON.
fn decode_value(envelope: &Value) -> Value {
    if let Some(s) = envelope.get("stringValue").and_then(Value::as_str) {
        return Value::from(s);
    }
    if let Some(n) = envelope.get("doubleValue").and_then(Value::as_f64) {
        return Value::from(n);
    }
    if let Some(raw) = envelope.get("integerValue") {
        // integerValue arrives as a decimal string
        let parsed = raw
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| raw.as_i64());
        if let Some(n) = parsed {
            return Value::from(n);
        }
    }
    if let Some(b) = envelope.get("booleanValue").and_then(Value::as_bool) {
        return Value::from(b);
    }
    if let Some(ts) = envelope.get("timestampValue").and_then(Value::as_str) {
        return Value::from(ts);
    }
    Value::Null
}

/// Wrap plain JSON in the envelope the document API expects.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::String(s) => json!({ "stringValue": s }),
        Value::Number(n) if n.is_i64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n.as_f64() }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Null => json!({ "nullValue": null }),
        other => json!({ "stringValue": other.to_string() }),
    }
}

fn encode_fields(fields: &Fields) -> Value {
    let mut encoded = serde_json::Map::new();
    for (name, value) in fields {
        encoded.insert(name.clone(), encode_value(value));
    }
    Value::Object(encoded)
}

fn documents_root(settings: &DocumentSettings, scope: &Scope) -> String {
    format!(
        "{}/v1/projects/{}/databases/(default)/documents",
        settings.api_url.trim_end_matches('/'),
        scope.base()
    )
}

fn collection_url(settings: &DocumentSettings, scope: &Scope) -> String {
    format!("{}/{}", documents_root(settings, scope), scope.table())
}

fn authorized(
    request: reqwest::RequestBuilder,
    settings: &DocumentSettings,
) -> reqwest::RequestBuilder {
    request.bearer_auth(settings.api_key.expose_secret())
}

pub(crate) async fn list(
    settings: &DocumentSettings,
    scope: &Scope,
) -> Result<Vec<Record>, ClientError> {
    let response = authorized(http_client().get(collection_url(settings, scope)), settings)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(error_for_status(response, None).await);
    }

    // An empty collection omits the `documents` key entirely.
    let list: ListResponse = response.json().await?;
    tracing::debug!(scope = %scope, count = list.documents.len(), "Listed documents");
    Ok(list.documents.into_iter().map(decode_document).collect())
}

pub(crate) async fn query_owner(
    settings: &DocumentSettings,
    scope: &Scope,
    owner: &UserId,
) -> Result<Vec<Record>, ClientError> {
    let url = format!("{}:runQuery", documents_root(settings, scope));
    let body = json!({
        "structuredQuery": {
            "from": [{ "collectionId": scope.table() }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": tally_types::task::fields::OWNER },
                    "op": "EQUAL",
                    "value": { "stringValue": owner.as_str() },
                }
            },
        }
    });

    let response = authorized(http_client().post(url), settings)
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(error_for_status(response, None).await);
    }

    let entries: Vec<QueryEntry> = response.json().await?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| entry.document)
        .map(decode_document)
        .collect())
}

pub(crate) async fn create(
    settings: &DocumentSettings,
    scope: &Scope,
    fields: Fields,
) -> Result<Record, ClientError> {
    let body = json!({ "fields": encode_fields(&fields) });
    let response = authorized(http_client().post(collection_url(settings, scope)), settings)
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(error_for_status(response, None).await);
    }

    let doc: ApiDocument = response.json().await?;
    tracing::debug!(scope = %scope, name = %doc.name, "Created document");
    Ok(decode_document(doc))
}

pub(crate) async fn update(
    settings: &DocumentSettings,
    scope: &Scope,
    id: &RecordId,
    fields: Fields,
) -> Result<Record, ClientError> {
    let url = format!("{}/{}", collection_url(settings, scope), id);

    // The update mask restricts the patch to exactly the supplied fields;
    // the exists precondition turns a blind upsert into a 404.
    let mut query: Vec<(&str, String)> = vec![("currentDocument.exists", "true".to_string())];
    for name in fields.keys() {
        query.push(("updateMask.fieldPaths", name.clone()));
    }

    let body = json!({ "fields": encode_fields(&fields) });
    let response = authorized(http_client().patch(url), settings)
        .query(&query)
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(error_for_status(response, Some(id)).await);
    }

    let doc: ApiDocument = response.json().await?;
    Ok(decode_document(doc))
}

#[cfg(test)]
mod tests {
    use super::{decode_value, document_id, encode_value};
    use serde_json::{Value, json};

    #[test]
    fn document_id_takes_last_path_segment() {
        let id = document_id("projects/p/databases/(default)/documents/tasks/abc123");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn encode_decode_string() {
        let encoded = encode_value(&json!("hello"));
        assert_eq!(encoded, json!({ "stringValue": "hello" }));
        assert_eq!(decode_value(&encoded), json!("hello"));
    }

    #[test]
    fn encode_decode_double() {
        let encoded = encode_value(&json!(4.25));
        assert_eq!(encoded, json!({ "doubleValue": 4.25 }));
        assert_eq!(decode_value(&encoded), json!(4.25));
    }

    #[test]
    fn integer_envelope_decodes_from_string() {
        assert_eq!(decode_value(&json!({ "integerValue": "42" })), json!(42));
    }

    #[test]
    fn unknown_envelope_decodes_to_null() {
        assert_eq!(decode_value(&json!({ "geoPointValue": {} })), Value::Null);
    }
}
