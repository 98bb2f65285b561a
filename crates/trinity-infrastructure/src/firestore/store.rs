//! REST implementation of [`DocumentStore`].

use super::value::{decode_document, encode_fields, encode_value};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use trinity_core::error::{Result, TrinityError};
use trinity_core::store::paths::{split_collection_path, split_document_path};
use trinity_core::store::{
    CollectionSubscription, Direction, Document, DocumentStore, DocumentSubscription, Query,
    Subscription, Write,
};
use uuid::Uuid;

const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Connection settings for [`FirestoreRestStore`].
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    /// Interval between polls of a live subscription
    pub poll_interval: Duration,
}

/// Document store backed by the hosted database's REST API.
///
/// Requests are authorized with the session's id token when one is set.
#[derive(Clone)]
pub struct FirestoreRestStore {
    client: Client,
    base_url: String,
    settings: FirestoreSettings,
    id_token: Option<String>,
}

impl FirestoreRestStore {
    pub fn new(settings: FirestoreSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            settings,
            id_token: None,
        }
    }

    /// Points the client at another endpoint, e.g. a local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Resource name prefix of every document.
    fn database_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.settings.project_id
        )
    }

    fn document_name(&self, path: &str) -> String {
        format!("{}/{}", self.database_root(), path)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| TrinityError::transport(None, format!("Firestore request failed: {err}")))?;
        Ok(response)
    }

    async fn error_from(response: reqwest::Response) -> TrinityError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read Firestore error body".to_string());
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);
        TrinityError::transport(Some(status.as_u16()), message)
    }

    async fn fetch_document(&self, path: &str) -> Result<Option<Document>> {
        split_document_path(path)?;
        let response = self
            .send(self.client.get(self.url(&self.document_name(path))))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let resource: Value = response
            .json()
            .await
            .map_err(|err| TrinityError::transport(None, format!("Failed to parse Firestore response: {err}")))?;
        decode_document(&resource).map(Some)
    }

    async fn run_query(&self, path: &str, query: &Query) -> Result<Vec<Document>> {
        let (parent, collection_id) = split_collection_path(path)?;
        let parent_name = match parent {
            Some(parent) => self.document_name(parent),
            None => self.database_root(),
        };

        let mut structured = json!({ "from": [{ "collectionId": collection_id }] });
        if let Some(filter) = &query.filter {
            structured["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            });
        }
        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASCENDING",
                Direction::Descending => "DESCENDING",
            };
            structured["orderBy"] =
                json!([{ "field": { "fieldPath": order.field }, "direction": direction }]);
        }
        if let Some(limit) = query.limit {
            structured["limit"] = json!(limit);
        }

        let response = self
            .send(
                self.client
                    .post(self.url(&format!("{parent_name}:runQuery")))
                    .json(&json!({ "structuredQuery": structured })),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|err| TrinityError::transport(None, format!("Failed to parse Firestore response: {err}")))?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }

    /// Commits a single write with optional field mask and existence precondition.
    async fn commit(
        &self,
        path: &str,
        write: Write,
        mask: bool,
        exists: Option<bool>,
    ) -> Result<()> {
        let mut entry = json!({
            "update": {
                "name": self.document_name(path),
                "fields": encode_fields(write.fields()),
            }
        });
        if mask {
            let field_paths: Vec<&String> = write.fields().keys().collect();
            entry["updateMask"] = json!({ "fieldPaths": field_paths });
        }
        if let Some(exists) = exists {
            entry["currentDocument"] = json!({ "exists": exists });
        }
        let transforms: Vec<Value> = write
            .server_timestamp_fields()
            .iter()
            .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
            .collect();
        if !transforms.is_empty() {
            entry["updateTransforms"] = Value::Array(transforms);
        }

        let response = self
            .send(
                self.client
                    .post(self.url(&format!("{}:commit", self.database_root())))
                    .json(&json!({ "writes": [entry] })),
            )
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(TrinityError::not_found("document", path)),
            StatusCode::BAD_REQUEST if exists == Some(true) => {
                let err = Self::error_from(response).await;
                if err.to_string().to_lowercase().contains("no document to update") {
                    Err(TrinityError::not_found("document", path))
                } else {
                    Err(err)
                }
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    /// Spawns a polling loop feeding `sender` until the token is cancelled.
    fn spawn_poller<T, F, Fut>(&self, path: String, sender: watch::Sender<T>, fetch: F) -> CancellationToken
    where
        T: PartialEq + Send + Sync + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let interval = self.settings.poll_interval;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                match fetch().await {
                    Ok(snapshot) => {
                        sender.send_if_modified(|current| {
                            if *current == snapshot {
                                false
                            } else {
                                *current = snapshot;
                                true
                            }
                        });
                    }
                    Err(err) => tracing::warn!(%path, error = %err, "Subscription poll failed"),
                }
            }
            tracing::debug!(%path, "Subscription poller stopped");
        });

        token
    }
}

#[async_trait]
impl DocumentStore for FirestoreRestStore {
    async fn subscribe_collection(&self, path: &str, query: Query) -> Result<CollectionSubscription> {
        let initial = self.run_query(path, &query).await?;
        let (sender, receiver) = watch::channel(initial);

        let store = self.clone();
        let owned_path = path.to_string();
        let token = self.spawn_poller(path.to_string(), sender, move || {
            let store = store.clone();
            let path = owned_path.clone();
            let query = query.clone();
            async move { store.run_query(&path, &query).await }
        });

        Ok(Subscription::new(receiver).with_cancel(move || token.cancel()))
    }

    async fn subscribe_document(&self, path: &str) -> Result<DocumentSubscription> {
        let initial = self.fetch_document(path).await?;
        let (sender, receiver) = watch::channel(initial);

        let store = self.clone();
        let owned_path = path.to_string();
        let token = self.spawn_poller(path.to_string(), sender, move || {
            let store = store.clone();
            let path = owned_path.clone();
            async move { store.fetch_document(&path).await }
        });

        Ok(Subscription::new(receiver).with_cancel(move || token.cancel()))
    }

    async fn list(&self, path: &str, query: Query) -> Result<Vec<Document>> {
        self.run_query(path, &query).await
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        self.fetch_document(path).await
    }

    async fn create(&self, collection_path: &str, write: Write) -> Result<String> {
        split_collection_path(collection_path)?;
        let id = Uuid::new_v4().simple().to_string();
        self.commit(&format!("{collection_path}/{id}"), write, false, Some(false))
            .await?;
        Ok(id)
    }

    async fn set(&self, document_path: &str, write: Write, merge: bool) -> Result<()> {
        split_document_path(document_path)?;
        self.commit(document_path, write, merge, None).await
    }

    async fn update(&self, document_path: &str, write: Write) -> Result<()> {
        split_document_path(document_path)?;
        self.commit(document_path, write, true, Some(true)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FirestoreRestStore {
        FirestoreRestStore::new(FirestoreSettings {
            project_id: "major-ai-trinity".into(),
            poll_interval: Duration::from_millis(50),
        })
    }

    #[test]
    fn test_document_name_is_rooted_in_project() {
        assert_eq!(
            store().document_name("users/u/journal/e1"),
            "projects/major-ai-trinity/databases/(default)/documents/users/u/journal/e1"
        );
    }

    #[tokio::test]
    async fn test_malformed_paths_fail_before_any_request() {
        let store = store().with_base_url("http://127.0.0.1:9");
        assert!(store.create("users/u", Write::new()).await.unwrap_err().is_validation());
        assert!(store
            .update("users/u/threads", Write::new())
            .await
            .unwrap_err()
            .is_validation());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let store = store().with_base_url("http://127.0.0.1:9");
        let err = store.get_document("users/u/progress/v1").await.unwrap_err();
        assert!(matches!(err, TrinityError::Transport { status_code: None, .. }));
    }
}
