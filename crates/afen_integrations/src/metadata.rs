//! Off-chain metadata service: stores uploaded artwork and user profiles.
//!
//! REST API rooted at `MarketConfig::api_base_url`.
//! - `POST /nft/create/` (multipart) -> `{ "nft": { "fileHash": ... } }`
//! - `GET /user/{address}` -> `{ "user": { "_id": ..., ... } }`

use std::time::Duration;

use afen_core::{MarketConfig, MarketError, UserProfile};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

const CREATE_NFT_PATH: &str = "/nft/create/";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Metadata service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response did not include a file hash")]
    MissingFileHash,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

impl From<MetadataError> for MarketError {
    fn from(err: MetadataError) -> Self {
        MarketError::Network(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A user-selected file to be stored alongside the NFT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AssetFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Fields of the `nft/create` multipart body.
#[derive(Debug, Clone)]
pub struct CreateNftRequest {
    pub file: AssetFile,
    pub title: String,
    pub royalty: u8,
    pub description: String,
    /// Quote-asset price as the user entered it.
    pub price: String,
    pub user_id: String,
}

/// The stored record's content hash, used as the on-chain token pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNft {
    pub file_hash: String,
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Store the artwork and its metadata. Only an HTTP 200 counts as success.
    async fn create_nft(&self, request: CreateNftRequest) -> Result<CreatedNft, MetadataError>;

    /// Look up the profile for a wallet address; `None` if there is none yet.
    async fn get_user(&self, address: &str) -> Result<Option<UserProfile>, MetadataError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct HttpMetadataService {
    client: Client,
    base_url: String,
}

impl HttpMetadataService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl MetadataService for HttpMetadataService {
    async fn create_nft(&self, request: CreateNftRequest) -> Result<CreatedNft, MetadataError> {
        let file_part = reqwest::multipart::Part::bytes(request.file.bytes)
            .file_name(request.file.file_name.clone())
            .mime_str(&request.file.mime_type)
            .map_err(|e| MetadataError::InvalidUpload(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("title", request.title)
            .text("royalty", request.royalty.to_string())
            .text("description", request.description)
            .text("price", request.price)
            .text("userId", request.user_id);

        debug!(file = %request.file.file_name, "uploading NFT metadata");

        let resp = self
            .client
            .post(self.url(CREATE_NFT_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status() != StatusCode::OK {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "nft/create rejected");
            return Err(MetadataError::Status { status, body });
        }

        let data: CreateNftResponse = resp
            .json()
            .await
            .map_err(|e| MetadataError::InvalidResponse(e.to_string()))?;

        match data.nft.and_then(|n| n.file_hash) {
            Some(file_hash) if !file_hash.is_empty() => Ok(CreatedNft { file_hash }),
            _ => Err(MetadataError::MissingFileHash),
        }
    }

    async fn get_user(&self, address: &str) -> Result<Option<UserProfile>, MetadataError> {
        let resp = self
            .client
            .get(self.url(&format!("/user/{address}")))
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MetadataError::Status { status, body });
        }

        let data: UserResponse = resp
            .json()
            .await
            .map_err(|e| MetadataError::InvalidResponse(e.to_string()))?;
        Ok(data.user)
    }
}

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateNftResponse {
    #[serde(default)]
    nft: Option<NftRecord>,
}

#[derive(Deserialize)]
struct NftRecord {
    #[serde(rename = "fileHash", default)]
    file_hash: Option<String>,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(default)]
    user: Option<UserProfile>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> HttpMetadataService {
        HttpMetadataService::new(format!("{}/api/", server.uri()), Duration::from_secs(5))
    }

    fn sample_request() -> CreateNftRequest {
        CreateNftRequest {
            file: AssetFile::new("sunset.png", "image/png", b"PNG-BYTES".to_vec()),
            title: "Sunset".into(),
            royalty: 10,
            description: "Evening over the bay".into(),
            price: "1.5".into(),
            user_id: "64f0c".into(),
        }
    }

    #[tokio::test]
    async fn create_nft_posts_multipart_and_returns_hash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/nft/create/"))
            .and(body_string_contains("name=\"title\""))
            .and(body_string_contains("Sunset"))
            .and(body_string_contains("name=\"userId\""))
            .and(body_string_contains("filename=\"sunset.png\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "nft": { "fileHash": "abc123", "title": "Sunset" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = service_for(&server).create_nft(sample_request()).await.unwrap();
        assert_eq!(created.file_hash, "abc123");
    }

    #[tokio::test]
    async fn create_nft_fails_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/nft/create/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = service_for(&server).create_nft(sample_request()).await.unwrap_err();
        assert!(matches!(err, MetadataError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn create_nft_treats_non_200_success_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "nft": { "fileHash": "abc123" } })),
            )
            .mount(&server)
            .await;

        let err = service_for(&server).create_nft(sample_request()).await.unwrap_err();
        assert!(matches!(err, MetadataError::Status { status: 201, .. }));
    }

    #[tokio::test]
    async fn create_nft_requires_file_hash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nft": {} })))
            .mount(&server)
            .await;

        let err = service_for(&server).create_nft(sample_request()).await.unwrap_err();
        assert!(matches!(err, MetadataError::MissingFileHash));
    }

    #[tokio::test]
    async fn create_nft_reports_unreachable_service() {
        let service = HttpMetadataService::new("http://127.0.0.1:9", Duration::from_secs(1));
        let err = service.create_nft(sample_request()).await.unwrap_err();
        assert!(matches!(err, MetadataError::Network(_)));
    }

    #[tokio::test]
    async fn get_user_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "_id": "64f0c", "name": "Ada", "avatar": "https://cdn/ada.png" }
            })))
            .mount(&server)
            .await;

        let user = service_for(&server).get_user("0xabc").await.unwrap().unwrap();
        assert_eq!(user.id, "64f0c");
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn get_user_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(service_for(&server).get_user("0xabc").await.unwrap(), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service =
            HttpMetadataService::new("https://api.example.com/api/", Duration::from_secs(1));
        assert_eq!(
            service.url(CREATE_NFT_PATH),
            "https://api.example.com/api/nft/create/"
        );
    }
}
