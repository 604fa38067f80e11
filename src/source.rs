// Copyright 2022 Alexander Krivács Schrøder
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// OR
//
// Licensed under the MIT License. See LICENSE-MIT for details.

//! Fetching the code of the commit under check.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use miette::Diagnostic;
use reqwest::header::AUTHORIZATION;
use tempfile::TempDir;
use thiserror::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("could not fetch {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not unpack source archive")]
    Unpack(#[source] std::io::Error),
    #[error("unpacking was interrupted")]
    Join(#[from] tokio::task::JoinError),
}

/// A checked out source tree. Trees backed by a temporary directory remove
/// it when dropped.
#[derive(Debug)]
pub struct SourceTree {
    root: PathBuf,
    _dir: Option<TempDir>,
}

impl SourceTree {
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _dir: None,
        }
    }

    fn extracted(dir: TempDir) -> Self {
        Self {
            root: dir.path().to_owned(),
            _dir: Some(dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
pub trait CodeProvider: Send + Sync {
    async fn download(&self, archive_url: &str) -> Result<SourceTree, DownloadError>;
}

/// Downloads and unpacks GitHub's gzipped tarball of a commit.
pub struct TarballDownloader {
    client: reqwest::Client,
    token: String,
}

impl TarballDownloader {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl CodeProvider for TarballDownloader {
    async fn download(&self, archive_url: &str) -> Result<SourceTree, DownloadError> {
        let request_error = |source: reqwest::Error| DownloadError::Request {
            url: archive_url.to_owned(),
            source,
        };

        tracing::info!("downloading {archive_url}");
        let archive = self
            .client
            .get(archive_url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(request_error)?
            .bytes()
            .await
            .map_err(request_error)?;

        tokio::task::spawn_blocking(move || unpack(&archive)).await?
    }
}

fn unpack(archive: &[u8]) -> Result<SourceTree, DownloadError> {
    let dir = tempfile::Builder::new()
        .prefix("fussyfox-")
        .tempdir()
        .map_err(DownloadError::Unpack)?;
    tar::Archive::new(GzDecoder::new(archive))
        .unpack(dir.path())
        .map_err(DownloadError::Unpack)?;
    tracing::debug!("unpacked {} bytes into {}", archive.len(), dir.path().display());
    Ok(SourceTree::extracted(dir))
}
