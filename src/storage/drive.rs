// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Drive-style REST client

use reqwest::blocking::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{FileMetadata, FileStorage, WriteRequest};
use crate::error::{PlannerError, Result};

/// Metadata API root
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload API root
pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

const JSON_MIME: &str = "application/json";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileMetadata>,
}

/// Blocking client authenticated with a bearer token
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    token: String,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    /// Client against the public endpoints
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoints(token, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE)
    }

    /// Client against custom endpoints
    pub fn with_endpoints(
        token: impl Into<String>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            upload_base: upload_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(PlannerError::Storage(format!("{what} failed ({status}): {body}")))
    }
}

impl FileStorage for DriveClient {
    fn search(&self, query: &str) -> Result<Vec<FileMetadata>> {
        debug!("Searching files: {query}");
        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&self.token)
            .query(&[
                ("q", query),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
                ("fields", "files(id, name, mimeType, parents)"),
            ])
            .send()?;
        let list: FileList = Self::check(response, "search")?.json()?;
        Ok(list.files)
    }

    fn read(&self, file_id: &str) -> Result<Vec<u8>> {
        debug!("Downloading file {file_id}");
        let response = self
            .http
            .get(format!("{}/files/{file_id}", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()?;
        Ok(Self::check(response, "download")?.bytes()?.to_vec())
    }

    fn write(&self, request: &WriteRequest) -> Result<FileMetadata> {
        let mut metadata = json!({ "name": request.name, "mimeType": JSON_MIME });
        if let Some(parent) = &request.parent_id {
            metadata["parents"] = json!([parent]);
        }

        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(serde_json::to_string(&metadata)?).mime_str(JSON_MIME)?,
            )
            .part(
                "file",
                multipart::Part::text(serde_json::to_string_pretty(&request.content)?)
                    .mime_str(JSON_MIME)?,
            );

        let builder = match &request.file_id {
            Some(id) => {
                debug!("Overwriting file {id}");
                self.http.patch(format!("{}/files/{id}", self.upload_base))
            }
            None => {
                debug!("Creating file {}", request.name);
                self.http.post(format!("{}/files", self.upload_base))
            }
        };

        let response = builder
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("supportsAllDrives", "true")])
            .multipart(form)
            .send()?;
        Ok(Self::check(response, "upload")?.json()?)
    }
}
