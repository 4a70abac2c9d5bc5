//! HTTP implementation of `NoteStore` for a PostgREST-style notes table.
//!
//! # Responsibility
//! - Translate logical note operations into REST requests.
//! - Decode response bodies into note records or confirmation flags.
//!
//! # Invariants
//! - Every request carries `apikey` and `Authorization: Bearer` headers.
//! - List/search results are ordered by `id.desc` on the server.
//! - Delete is confirmed only by a body that is exactly `[]`.
//! - Update is confirmed only by a decoded record carrying the target id.

use crate::config::RemoteConfig;
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::store::note_store::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use std::fmt;
use std::time::Instant;

const HEADER_API_KEY: &str = "apikey";
const HEADER_ACCEPT_PROFILE: &str = "Accept-Profile";
const HEADER_PREFER: &str = "Prefer";
const PREFER_REPRESENTATION: &str = "return=representation";
const SCHEMA_PUBLIC: &str = "public";
const ORDER_NEWEST_FIRST: &str = "id.desc";
const EMPTY_ARRAY_BODY: &str = "[]";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Deserialize)]
struct AffectedRow {
    #[serde(deserialize_with = "crate::model::note::deserialize_note_id")]
    id: NoteId,
}

/// Stateless REST client for the notes collection.
#[derive(Clone)]
pub struct RestNoteStore {
    client: Client,
    collection_url: String,
    api_key: String,
}

impl RestNoteStore {
    /// Creates a store with a default `reqwest` client.
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a store reusing a caller-provided client (shared pool,
    /// custom timeouts).
    pub fn with_client(client: Client, config: &RemoteConfig) -> Self {
        Self {
            client,
            collection_url: config.collection_url(),
            api_key: config.api_key().to_string(),
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.collection_url.as_str())
            .header(HEADER_API_KEY, self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn read_request(&self) -> RequestBuilder {
        self.request(Method::GET)
            .header(HEADER_ACCEPT_PROFILE, SCHEMA_PUBLIC)
            .query(&[("select", "*")])
    }

    fn write_request(&self, method: Method, draft: &NoteDraft) -> StoreResult<RequestBuilder> {
        let body = serde_json::to_string(draft).map_err(|err| StoreError::Decode {
            operation: "encode_draft",
            message: err.to_string(),
        })?;
        Ok(self
            .request(method)
            .header(HEADER_PREFER, PREFER_REPRESENTATION)
            .header(CONTENT_TYPE, "application/json")
            .body(body))
    }

    /// Sends one request and returns the body of a success response.
    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> StoreResult<String> {
        let started_at = Instant::now();
        debug!("event=store_request module=store status=start op={operation}");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(
                    "event=store_request module=store status=error op={} duration_ms={} error_code=transport error={}",
                    operation,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(StoreError::Remote {
                    status: None,
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|err| StoreError::Remote {
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {err}"),
        })?;

        if !status.is_success() {
            warn!(
                "event=store_request module=store status=error op={} duration_ms={} error_code=http_status http_status={}",
                operation,
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(StoreError::Remote {
                status: Some(status.as_u16()),
                message: truncate_body(&body),
            });
        }

        info!(
            "event=store_request module=store status=ok op={} duration_ms={} http_status={}",
            operation,
            started_at.elapsed().as_millis(),
            status.as_u16()
        );
        Ok(body)
    }
}

impl fmt::Debug for RestNoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestNoteStore")
            .field("collection_url", &self.collection_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NoteStore for RestNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let request = self.read_request().query(&[("order", ORDER_NEWEST_FIRST)]);
        let body = self.execute("list", request).await?;
        decode_notes("list", &body)
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Note>> {
        let request = self
            .read_request()
            .query(&[("or", search_filter(term).as_str())])
            .query(&[("order", ORDER_NEWEST_FIRST)]);
        let body = self.execute("search", request).await?;
        decode_notes("search", &body)
    }

    async fn create(&self, draft: &NoteDraft) -> StoreResult<Note> {
        let request = self.write_request(Method::POST, draft)?;
        let body = self.execute("create", request).await?;
        decode_notes("create", &body)?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyResult {
                operation: "create",
            })
    }

    async fn update(&self, id: &str, draft: &NoteDraft) -> StoreResult<bool> {
        let request = self
            .write_request(Method::PATCH, draft)?
            .query(&[("id", id_filter(id).as_str())]);
        let body = self.execute("update", request).await?;
        let confirmed = update_confirms_id(&body, id);
        if !confirmed {
            info!("event=store_update module=store status=unconfirmed");
        }
        Ok(confirmed)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let request = self
            .request(Method::DELETE)
            .query(&[("id", id_filter(id).as_str())]);
        let body = self.execute("delete", request).await?;
        let confirmed = body == EMPTY_ARRAY_BODY;
        if !confirmed {
            info!(
                "event=store_delete module=store status=unconfirmed body_chars={}",
                body.chars().count()
            );
        }
        Ok(confirmed)
    }
}

fn decode_notes(operation: &'static str, body: &str) -> StoreResult<Vec<Note>> {
    serde_json::from_str(body).map_err(|err| StoreError::Decode {
        operation,
        message: err.to_string(),
    })
}

fn update_confirms_id(body: &str, id: &str) -> bool {
    serde_json::from_str::<Vec<AffectedRow>>(body)
        .map(|rows| rows.iter().any(|row| row.id == id))
        .unwrap_or(false)
}

fn id_filter(id: &str) -> String {
    format!("eq.{id}")
}

/// Builds the `or` filter matching `term` in title or content.
///
/// Terms containing PostgREST reserved characters are double-quoted so they
/// cannot break out of the filter list.
fn search_filter(term: &str) -> String {
    let pattern = format!("*{term}*");
    let value = if term.contains([',', '.', ':', '(', ')', '"', '\\']) {
        format!("\"{}\"", pattern.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        pattern
    };
    format!("(title.ilike.{value},content.ilike.{value})")
}

fn truncate_body(body: &str) -> String {
    let normalized = body.replace(['\n', '\r'], " ");
    let mut truncated = normalized
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect::<String>();
    if normalized.chars().count() > MAX_ERROR_BODY_CHARS {
        truncated.push_str("...");
    }
    truncated
}
