//! Share-link collaborator.
//!
//! Only descriptive metadata about an export leaves the engine; the artifact
//! bytes never do. A failed share request is logged and recorded on the
//! result, the export itself still counts as successful.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{RunResult, ShareLink},
    ReportError, Result,
};

pub const SHARE_URL_ENV_VAR: &str = "PLAYBOOK_SHARE_URL";
pub const SHARE_TOKEN_ENV_VAR: &str = "PLAYBOOK_SHARE_TOKEN";

/// Resource type announced for every share request.
pub const RESOURCE_TYPE: &str = "export";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpirationPolicy {
    Never,
    AfterDays { days: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PasswordPolicy {
    None,
    Required { password: String },
}

/// What the caller asks the collaborator for.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub expiration: ExpirationPolicy,
    pub password: PasswordPolicy,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            permissions: vec!["view".to_string()],
            expiration: ExpirationPolicy::AfterDays { days: 30 },
            password: PasswordPolicy::None,
        }
    }
}

/// Description of the produced artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
    pub template_id: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub title: String,
    pub description: String,
    pub resource_type: String,
    pub resource_id: Uuid,
    pub resource: ResourceDescriptor,
    pub permissions: Vec<String>,
    pub expiration: ExpirationPolicy,
    pub password: PasswordPolicy,
}

impl ShareRequest {
    /// Build a request for a successful run. `None` for failed runs.
    pub fn for_result(result: &RunResult, options: &ShareOptions) -> Option<Self> {
        if !result.success {
            return None;
        }
        let filename = result.filename.clone()?;
        let metadata = result.metadata.as_ref()?;
        let title = options.title.clone().unwrap_or_else(|| filename.clone());
        let description = options.description.clone().unwrap_or_else(|| {
            format!(
                "{} plays exported with the {} template",
                metadata.record_count, metadata.template_id
            )
        });
        Some(Self {
            title,
            description,
            resource_type: RESOURCE_TYPE.to_string(),
            resource_id: Uuid::new_v4(),
            resource: ResourceDescriptor {
                filename,
                mime_type: result.mime_type.clone().unwrap_or_default(),
                size: result.size,
                template_id: metadata.template_id.clone(),
                record_count: metadata.record_count,
            },
            permissions: options.permissions.clone(),
            expiration: options.expiration.clone(),
            password: options.password.clone(),
        })
    }
}

/// External service that issues share links.
#[async_trait]
pub trait ShareService: Send + Sync {
    async fn create_share(&self, request: &ShareRequest) -> Result<ShareLink>;
}

/// Wire shape of the collaborator's reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShareResponse {
    public_url: String,
    /// Base64 PNG.
    qr_code: Option<String>,
}

impl ShareResponse {
    pub(crate) fn into_link(self) -> ShareLink {
        let qr_code = self.qr_code.and_then(|encoded| {
            general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| warn!("Ignoring undecodable QR code: {}", e))
                .ok()
        });
        ShareLink {
            public_url: self.public_url,
            qr_code,
        }
    }
}

/// JSON-over-HTTP share service: `POST {base_url}/shares`.
#[derive(Debug, Clone)]
pub struct HttpShareService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpShareService {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Configured from `PLAYBOOK_SHARE_URL` and `PLAYBOOK_SHARE_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(SHARE_URL_ENV_VAR).ok().filter(|s| !s.trim().is_empty())?;
        let token = std::env::var(SHARE_TOKEN_ENV_VAR).ok().filter(|s| !s.is_empty());
        Some(Self::new(base_url, token))
    }

    pub fn shares_url(&self) -> String {
        format!("{}/shares", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ShareService for HttpShareService {
    async fn create_share(&self, request: &ShareRequest) -> Result<ShareLink> {
        let mut builder = self.client.post(self.shares_url()).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder
            .send()
            .await?
            .error_for_status()?
            .json::<ShareResponse>()
            .await?;
        if response.public_url.trim().is_empty() {
            return Err(ReportError::Share {
                message: "service returned an empty public url".to_string(),
            });
        }
        Ok(response.into_link())
    }
}

/// Ask `service` for a share link and merge it into `result`.
///
/// Failed runs are returned untouched. A sharing error never turns a
/// successful run into a failed one.
pub async fn share_result(
    result: RunResult,
    service: &dyn ShareService,
    options: &ShareOptions,
) -> RunResult {
    let Some(request) = ShareRequest::for_result(&result, options) else {
        return result;
    };
    match service.create_share(&request).await {
        Ok(link) => {
            info!("Shared {} at {}", request.resource.filename, link.public_url);
            RunResult {
                share: Some(link),
                ..result
            }
        }
        Err(e) => {
            warn!("Could not share {}: {}", request.resource.filename, e);
            RunResult {
                share_error: Some(e.to_string()),
                ..result
            }
        }
    }
}
