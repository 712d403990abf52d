//! HTTP note store for the Letta blocks API.
//!
//! Endpoints:
//! - `GET /v1/blocks` with `description_search` / `label` filters
//! - `POST /v1/blocks`
//! - `PATCH /v1/blocks/{id}`
//! - `DELETE /v1/blocks/{id}`
//! - `GET /v1/agents/` with `query_text`

use crate::config::ClientConfig;
use anyhow::Context;
use async_trait::async_trait;
use notesync_core::{
    Agent, CreateNoteRequest, ListAgentsQuery, ListNotesQuery, Note, NoteStore, SyncError,
    UpdateNoteRequest,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

type SyncResult<T> = notesync_core::Result<T>;

/// Authenticated client for the remote blocks API.
#[cfg_attr(test, derive(Debug))]
pub struct HttpNoteStore {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpNoteStore {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    /// Send and fail on anything but 2xx, keeping the body verbatim.
    async fn send(&self, request: RequestBuilder, what: &str) -> SyncResult<Response> {
        let resp = request
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("{}: {}", what, e)))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status, %body, "{} failed", what);
            return Err(SyncError::Api { status, body });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> SyncResult<T> {
        self.send(request, what)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl NoteStore for HttpNoteStore {
    async fn list_notes(&self, query: &ListNotesQuery) -> SyncResult<Vec<Note>> {
        let request = self.request(Method::GET, "/v1/blocks").query(query);
        self.send_json(request, "GET /v1/blocks").await
    }

    async fn create_note(&self, body: &CreateNoteRequest) -> SyncResult<Note> {
        let request = self.request(Method::POST, "/v1/blocks").json(body);
        self.send_json(request, "POST /v1/blocks").await
    }

    async fn update_note(&self, id: &str, body: &UpdateNoteRequest) -> SyncResult<Note> {
        let request = self
            .request(Method::PATCH, &format!("/v1/blocks/{}", id))
            .json(body);
        self.send_json(request, "PATCH /v1/blocks").await
    }

    async fn delete_note(&self, id: &str) -> SyncResult<()> {
        let request = self.request(Method::DELETE, &format!("/v1/blocks/{}", id));
        self.send(request, "DELETE /v1/blocks").await?;
        Ok(())
    }

    async fn list_agents(&self, query: &ListAgentsQuery) -> SyncResult<Vec<Agent>> {
        let request = self.request(Method::GET, "/v1/agents/").query(query);
        self.send_json(request, "GET /v1/agents").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REQUEST_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> HttpNoteStore {
        HttpNoteStore::new(&ClientConfig {
            base_url: base_url.to_string(),
            api_key: "sk-test".to_string(),
            timeout: REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_notes_sends_owner_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/blocks"))
            .and(query_param("description_search", "owner:agent-1"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "block-1", "label": "/todo", "value": "buy milk", "description": "owner:agent-1"},
                {"id": "block-2", "label": "persona", "value": "helpful", "description": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let notes = client
            .list_notes(&ListNotesQuery::owned_by("owner:agent-1"))
            .await
            .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].value, "buy milk");
        assert_eq!(notes[1].description, "");
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/blocks"))
            .and(body_json(json!({
                "label": "/todo",
                "value": "buy milk",
                "description": "owner:agent-1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "block-9", "label": "/todo", "value": "buy milk", "description": "owner:agent-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/v1/blocks/block-9"))
            .and(body_json(json!({"value": "buy bread"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "block-9", "label": "/todo", "value": "buy bread", "description": "owner:agent-1"
            })))
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/", server.uri()));
        let created = client
            .create_note(&CreateNoteRequest {
                label: "/todo".to_string(),
                value: "buy milk".to_string(),
                description: "owner:agent-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, "block-9");

        let updated = client
            .update_note(
                "block-9",
                &UpdateNoteRequest {
                    value: "buy bread".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.value, "buy bread");
    }

    #[tokio::test]
    async fn test_delete_and_agents() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/blocks/block-3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/agents/"))
            .and(query_param("query_text", "research"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "agent-1", "name": "Research Assistant", "created_at": "2025-01-01T00:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.delete_note("block-3").await.unwrap();

        let agents = client
            .list_agents(&ListAgentsQuery {
                query_text: Some("research".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "Research Assistant");
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/blocks"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"detail\":\"bad key\"}"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .list_notes(&ListNotesQuery::default())
            .await
            .unwrap_err();
        match err {
            SyncError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "{\"detail\":\"bad key\"}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_bad_json_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/blocks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .list_notes(&ListNotesQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
    }
}
