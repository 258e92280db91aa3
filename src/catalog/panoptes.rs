//! Zooniverse Panoptes catalog client.
//!
//! Talks JSON to the Panoptes REST API:
//!
//! 1. `POST /subject_sets` creates a set linked to the project
//! 2. `POST /subjects` creates a subject with one `image/jpeg` location per
//!    file; the response carries a signed upload URL for each location
//! 3. `PUT <signed url>` uploads each file's bytes
//! 4. `POST /subject_sets/{id}/links/subjects` adds the subject to the set
//!
//! A rejected set creation whose error says the display name "has already
//! been taken" becomes [`CreateOutcome::AlreadyExists`].

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::CatalogError;

use super::{Catalog, CreateOutcome, SubjectId, SubjectMetadata, SubjectSetHandle};

/// Public Panoptes API endpoint.
pub const DEFAULT_PANOPTES_URL: &str = "https://www.zooniverse.org/api";

const API_ACCEPT: &str = "application/vnd.api+json; version=1";
const JPEG_MIME: &str = "image/jpeg";

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResourceRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SubjectSetsResponse {
    subject_sets: Vec<ResourceRef>,
}

#[derive(Debug, Deserialize)]
struct SubjectResource {
    id: String,

    /// One `{mime type: signed upload url}` map per location
    #[serde(default)]
    locations: Vec<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct SubjectsResponse {
    subjects: Vec<SubjectResource>,
}

// =============================================================================
// Client
// =============================================================================

/// Catalog backed by a Zooniverse project.
#[derive(Debug, Clone)]
pub struct PanoptesCatalog {
    client: Client,
    base_url: String,
    project_id: String,
    token: String,
}

impl PanoptesCatalog {
    /// Create a client for `project_id`, authenticating with a bearer token.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("subject-stacker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            token: token.into(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, API_ACCEPT)
            .bearer_auth(&self.token)
    }

    /// Request body for creating a subject set.
    pub fn subject_set_body(&self, name: &str) -> Value {
        json!({
            "subject_sets": {
                "display_name": name,
                "links": { "project": self.project_id }
            }
        })
    }

    /// Request body for creating a subject with `image_count` JPEG locations.
    pub fn subject_body(&self, image_count: usize, metadata: &SubjectMetadata) -> Value {
        json!({
            "subjects": {
                "locations": vec![JPEG_MIME; image_count],
                "metadata": metadata,
                "links": { "project": self.project_id }
            }
        })
    }

    /// Request body linking a subject to a set.
    pub fn link_body(subject_id: &str) -> Value {
        json!({ "subjects": [subject_id] })
    }
}

/// Whether an error body reports a taken subject set name.
pub(crate) fn is_duplicate_name(body: &str) -> bool {
    let body = body.to_ascii_lowercase();
    body.contains("already been taken") || body.contains("has already been used")
}

/// Turn a non-success response into [`CatalogError::Api`].
async fn check(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CatalogError::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_subject_set(body: &[u8]) -> Result<String, CatalogError> {
    let parsed: SubjectSetsResponse = serde_json::from_slice(body)
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
    parsed
        .subject_sets
        .into_iter()
        .next()
        .map(|set| set.id)
        .ok_or_else(|| CatalogError::InvalidResponse("no subject set in response".to_string()))
}

fn parse_subject(body: &[u8]) -> Result<(String, Vec<String>), CatalogError> {
    let parsed: SubjectsResponse = serde_json::from_slice(body)
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
    let subject = parsed
        .subjects
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::InvalidResponse("no subject in response".to_string()))?;

    let urls = subject
        .locations
        .into_iter()
        .map(|location| {
            location.into_values().next().ok_or_else(|| {
                CatalogError::InvalidResponse("empty location in response".to_string())
            })
        })
        .collect::<Result<Vec<String>, CatalogError>>()?;

    Ok((subject.id, urls))
}

#[async_trait]
impl Catalog for PanoptesCatalog {
    fn backend(&self) -> &str {
        "panoptes"
    }

    async fn create_subject_set(&self, name: &str) -> Result<CreateOutcome, CatalogError> {
        let response = self
            .request(Method::POST, "subject_sets")
            .json(&self.subject_set_body(name))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let id = parse_subject_set(&body)?;
            info!(name, id = %id, "created subject set");
            return Ok(CreateOutcome::Created(SubjectSetHandle::new(id, name)));
        }

        let message = String::from_utf8_lossy(&body).into_owned();
        if status.is_client_error() && is_duplicate_name(&message) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn attach_images(
        &self,
        set: &SubjectSetHandle,
        files: &[PathBuf],
        metadata: &SubjectMetadata,
    ) -> Result<SubjectId, CatalogError> {
        // Read everything before creating remote state.
        let mut payloads = Vec::with_capacity(files.len());
        for file in files {
            let data = tokio::fs::read(file).await.map_err(|e| CatalogError::Io {
                path: file.clone(),
                message: e.to_string(),
            })?;
            payloads.push(data);
        }

        let response = self
            .request(Method::POST, "subjects")
            .json(&self.subject_body(files.len(), metadata))
            .send()
            .await?;
        let body = check(response).await?.bytes().await?;
        let (subject_id, upload_urls) = parse_subject(&body)?;

        if upload_urls.len() != payloads.len() {
            return Err(CatalogError::InvalidResponse(format!(
                "expected {} upload locations, got {}",
                payloads.len(),
                upload_urls.len()
            )));
        }

        for (url, data) in upload_urls.iter().zip(payloads) {
            let response = self
                .client
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, JPEG_MIME)
                .header("x-ms-blob-type", "BlockBlob")
                .body(data)
                .send()
                .await?;
            check(response).await?;
        }

        let link_path = format!("subject_sets/{}/links/subjects", set.id);
        let response = self
            .request(Method::POST, &link_path)
            .json(&Self::link_body(&subject_id))
            .send()
            .await?;
        check(response).await?;

        debug!(set = %set.name, subject = %subject_id, files = files.len(), "uploaded subject");
        Ok(SubjectId(subject_id))
    }
}
