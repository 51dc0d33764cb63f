// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File hosting uploads.
//!
//! Two providers with different retention: tmpfiles.org links expire after
//! an hour, catbox.moe links are permanent. Uploads are multipart form
//! posts capped at 50 MB.

use std::time::Duration;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use nimbus_core::NimbusError;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Upload size ceiling in bytes (50 MB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const DEFAULT_TMPFILES_BASE: &str = "https://tmpfiles.org";
const DEFAULT_CATBOX_BASE: &str = "https://catbox.moe";

/// The hosting provider to upload to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingService {
    /// tmpfiles.org, links expire after one hour.
    TmpFiles,
    /// catbox.moe, permanent links.
    Catbox,
}

impl HostingService {
    /// Human-readable provider name for status messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            HostingService::TmpFiles => "TmpFiles.org",
            HostingService::Catbox => "Catbox.moe",
        }
    }

    /// Retention description shown after a successful upload.
    pub fn retention(&self) -> &'static str {
        match self {
            HostingService::TmpFiles => "1 hour",
            HostingService::Catbox => "Permanent",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmpFilesResponse {
    data: TmpFilesData,
}

#[derive(Debug, Deserialize)]
struct TmpFilesData {
    url: String,
}

/// Client for the file hosting providers.
#[derive(Debug, Clone)]
pub struct HostingClient {
    client: reqwest::Client,
    tmpfiles_base: String,
    catbox_base: String,
}

impl Default for HostingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HostingClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            tmpfiles_base: DEFAULT_TMPFILES_BASE.to_string(),
            catbox_base: DEFAULT_CATBOX_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_bases(mut self, tmpfiles: String, catbox: String) -> Self {
        self.tmpfiles_base = tmpfiles;
        self.catbox_base = catbox;
        self
    }

    /// Upload `bytes` to the chosen provider and return the public URL.
    ///
    /// `extension` names the file type for providers that key off the
    /// filename (e.g. "jpg", "mp4").
    pub async fn upload(
        &self,
        service: HostingService,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<String, NimbusError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
            return Err(NimbusError::Validation(format!(
                "File too large: {size_mb:.2}MB. Limit is 50MB."
            )));
        }

        debug!(service = service.display_name(), size = bytes.len(), "uploading media");

        match service {
            HostingService::TmpFiles => self.upload_tmpfiles(bytes, extension).await,
            HostingService::Catbox => self.upload_catbox(bytes).await,
        }
    }

    async fn upload_tmpfiles(
        &self,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<String, NimbusError> {
        let file_name = format!("nimbus_{}.{extension}", Utc::now().timestamp_millis());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/api/v1/upload", self.tmpfiles_base))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| upload_error("TmpFiles", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NimbusError::api(format!(
                "TmpFiles upload failed with {status}"
            )));
        }

        let parsed: TmpFilesResponse = response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse TmpFiles response: {e}"),
            source: Some(Box::new(e)),
        })?;

        // Rewriting to the /dl/ path gives a direct download link.
        Ok(parsed.data.url.replace("tmpfiles.org/", "tmpfiles.org/dl/"))
    }

    async fn upload_catbox(&self, bytes: Vec<u8>) -> Result<String, NimbusError> {
        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", Part::bytes(bytes).file_name("file"));

        let response = self
            .client
            .post(format!("{}/user/api.php", self.catbox_base))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| upload_error("Catbox", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NimbusError::api(format!(
                "Catbox upload failed with {status}"
            )));
        }

        let url = response.text().await.map_err(|e| NimbusError::Api {
            message: format!("failed to read Catbox response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(url.trim().to_string())
    }
}

fn upload_error(provider: &str, error: reqwest::Error) -> NimbusError {
    if error.is_timeout() {
        NimbusError::Timeout {
            duration: UPLOAD_TIMEOUT,
        }
    } else {
        NimbusError::Api {
            message: format!("{provider} upload failed: {error}"),
            source: Some(Box::new(error)),
        }
    }
}
