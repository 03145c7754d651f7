//! File upload capability
//!
//! A flow with a `File` component reads its input from a server-side path.
//! Uploading a local file returns that path, which is then pointed at the
//! target components through tweaks:
//!
//! ```text
//! upload(report.pdf) -> {"file_path": "<flow>/report.pdf"}
//! tweaks["File-oYNDr"] = {"path": "<flow>/report.pdf"}
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{FlowError, Result};
use crate::request::Tweaks;

#[cfg(feature = "upload")]
pub use http::HttpUploader;

/// Uploads a file and returns tweaks that reference it
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, file_path: &Path, components: &[String], tweaks: Tweaks) -> Result<Tweaks>;
}

/// Absent uploader: every upload is a configuration error
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUploader;

#[async_trait]
impl FileUploader for NoUploader {
    async fn upload(&self, file_path: &Path, _components: &[String], _tweaks: Tweaks) -> Result<Tweaks> {
        Err(FlowError::configuration(format!(
            "file upload is not available; cannot upload {}",
            file_path.display()
        )))
    }
}

/// Point each component at the uploaded path (replacing its previous tweaks)
pub fn apply_upload(tweaks: &mut Tweaks, components: &[String], remote_path: &str) {
    for component in components {
        tweaks.insert(component.clone(), json!({ "path": remote_path }));
    }
}

/// Split a comma-separated component list, dropping blanks
pub fn parse_components(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(feature = "upload")]
mod http {
    use std::path::Path;

    use async_trait::async_trait;
    use reqwest::multipart::{Form, Part};
    use serde::Deserialize;
    use tracing::{info, instrument, warn};

    use super::{apply_upload, FileUploader};
    use crate::auth::AuthContext;
    use crate::error::{truncate_body, FlowError, Result, TransportError, LOG_BODY_LIMIT};
    use crate::request::Tweaks;

    #[derive(Debug, Deserialize)]
    struct UploadResponse {
        #[serde(default)]
        file_path: Option<String>,
    }

    /// Uploads through the deployment's `/api/v1/upload/<flow>` route
    pub struct HttpUploader {
        client: reqwest::Client,
        auth: AuthContext,
        endpoint: String,
    }

    impl HttpUploader {
        pub fn new(auth: AuthContext, endpoint: impl Into<String>) -> Self {
            Self::with_client(reqwest::Client::new(), auth, endpoint)
        }

        pub fn with_client(client: reqwest::Client, auth: AuthContext, endpoint: impl Into<String>) -> Self {
            Self {
                client,
                auth,
                endpoint: endpoint.into(),
            }
        }
    }

    #[async_trait]
    impl FileUploader for HttpUploader {
        #[instrument(skip_all, fields(file = %file_path.display(), components = components.len()))]
        async fn upload(&self, file_path: &Path, components: &[String], mut tweaks: Tweaks) -> Result<Tweaks> {
            if components.is_empty() {
                return Err(FlowError::configuration(
                    "You need to provide the components to upload the file to",
                ));
            }

            let url = self.auth.upload_url(&self.endpoint)?;
            let bytes = tokio::fs::read(file_path)
                .await
                .map_err(|e| FlowError::upload(file_path, format!("cannot read file: {}", e)))?;
            let file_name = file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
            let mut builder = self.client.post(&url).multipart(form);
            if let Some(bearer) = self.auth.bearer() {
                builder = builder.header("Authorization", bearer);
            }

            let response = builder.send().await.map_err(TransportError::from)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(TransportError::from)?;

            if status != 200 && status != 201 {
                warn!(status, body = %truncate_body(&body, LOG_BODY_LIMIT), "file upload rejected");
                return Err(FlowError::remote(status, body));
            }

            let parsed: UploadResponse =
                serde_json::from_str(&body).map_err(|e| FlowError::invalid_response(url.as_str(), e))?;
            let remote_path = parsed
                .file_path
                .filter(|p| !p.is_empty())
                .ok_or_else(|| FlowError::upload(file_path, "response did not include a file_path"))?;

            info!(remote_path = %remote_path, "file uploaded");
            apply_upload(&mut tweaks, components, &remote_path);
            Ok(tweaks)
        }
    }
}
