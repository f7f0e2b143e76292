//! Firestore document store
//!
//! Collection-scoped CRUD through the Firestore REST API. Requests carry the
//! caller's Firebase ID token so the project's security rules apply to them.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use urlencoding::encode;

use crate::adapters::firebase::value::{decode_fields, encode_fields};
use crate::domain::ports::{DocumentStore, Fields, StoredDocument};
use crate::error::StoreError;

/// Documents requested per list call
const PAGE_SIZE: &str = "300";

/// Document store backed by Cloud Firestore
pub struct FirestoreDocumentStore {
    http: Client,
    documents_url: String,
    api_key: String,
}

impl FirestoreDocumentStore {
    pub fn new(base_url: String, project_id: String, api_key: String) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            base_url.trim_end_matches('/'),
            encode(&project_id)
        );
        Self {
            http: Client::new(),
            documents_url,
            api_key,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, encode(collection))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), encode(id))
    }

    fn authorize(&self, request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
        let request = request.query(&[("key", self.api_key.as_str())]);
        match auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))
        } else {
            Err(error_for(status.as_u16(), response).await)
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(error_for(status.as_u16(), response).await)
        }
    }
}

async fn error_for(status: u16, response: reqwest::Response) -> StoreError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);

    match status {
        401 => StoreError::Unauthenticated,
        403 => StoreError::PermissionDenied(message),
        404 => StoreError::NotFound(message),
        _ => StoreError::Api { status, message },
    }
}

/// Request body for create/patch calls
#[derive(Serialize)]
struct DocumentBody {
    fields: Map<String, Value>,
}

/// Response types from the Firestore API
#[derive(Deserialize)]
struct DocumentResponse {
    /// Full resource name, ending in `/{collection}/{id}`
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl TryFrom<DocumentResponse> for StoredDocument {
    type Error = StoreError;

    fn try_from(doc: DocumentResponse) -> Result<Self, Self::Error> {
        Ok(StoredDocument {
            id: document_id(&doc.name)?,
            fields: decode_fields(&doc.fields)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<DocumentResponse>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn document_id(name: &str) -> Result<String, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Decode(format!("document name without id: {}", name)))
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<String, StoreError> {
        let request = self.http.post(self.collection_url(collection));
        let response = self
            .authorize(request, auth_token)
            .json(&DocumentBody {
                fields: encode_fields(&fields),
            })
            .send()
            .await?;

        let doc: DocumentResponse = self.handle_response(response).await?;
        document_id(&doc.name)
    }

    async fn fetch_all(
        &self,
        collection: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.collection_url(collection))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = self.authorize(request, auth_token).send().await?;
            let page: ListResponse = self.handle_response(response).await?;

            for doc in page.documents {
                documents.push(StoredDocument::try_from(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut query: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        // Never create a document through an update
        query.push(("currentDocument.exists", "true"));

        let request = self.http.patch(self.document_url(collection, id)).query(&query);
        let response = self
            .authorize(request, auth_token)
            .json(&DocumentBody {
                fields: encode_fields(&fields),
            })
            .send()
            .await?;

        let _: DocumentResponse = self.handle_response(response).await?;
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let request = self.http.delete(self.document_url(collection, id));
        let response = self.authorize(request, auth_token).send().await?;
        self.handle_empty_response(response).await
    }
}
