//! Multipart file uploads

use super::{ApiClient, error::ClientError, error_message};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Form field used when the caller has no preference
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

const UPLOAD_FAILED: &str = "Upload failed";

/// File content sent as one multipart field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    content: Vec<u8>,
    mime_type: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());

        let mut file = Self::new(file_name, content);
        file.mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_for_extension)
            .map(str::to_string);
        Ok(file)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn into_part(self) -> Result<Part, ClientError> {
        let part = Part::bytes(self.content).file_name(self.file_name);
        match self.mime_type {
            Some(mime_type) => Ok(part.mime_str(&mime_type)?),
            None => Ok(part),
        }
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => return None,
    };
    Some(mime)
}

impl ApiClient {
    /// POST `file` as the multipart field `field_name`
    ///
    /// The multipart content type is left to the transport so it can add the
    /// boundary. Unlike [`ApiClient::request`], a 401 here does not end the
    /// session.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file: UploadFile,
        field_name: &str,
    ) -> Result<T, ClientError> {
        // Appended to the base rather than resolved against it
        let url = Url::parse(&format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        ))?;

        debug!(%url, field = field_name, bytes = file.len(), "Uploading file");

        let form = Form::new().part(field_name.to_string(), file.into_part()?);
        let mut request = self.client.post(url).multipart(form);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = error_message(response, UPLOAD_FAILED).await;
            return Err(ClientError::from_status(status, message));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_path_reads_name_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Invoice-0042.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();

        assert_eq!(file.file_name(), "Invoice-0042.PDF");
        assert_eq!(file.mime_type(), Some("application/pdf"));
        assert_eq!(file.len(), 8);
    }

    #[tokio::test]
    async fn from_path_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = UploadFile::from_path(dir.path().join("missing.csv")).await;
        assert!(matches!(result, Err(ClientError::Io(_))));
    }

    #[test]
    fn unknown_extension_has_no_mime() {
        assert_eq!(mime_for_extension("xyz"), None);
        assert_eq!(mime_for_extension("JPEG"), Some("image/jpeg"));
    }
}
