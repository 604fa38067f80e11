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

//! Authenticated GitHub access for a single invocation.

use miette::Diagnostic;
use octocrab::models::AppId;
use octocrab::Octocrab;
use thiserror::Error;

use crate::config::{Config, Credentials};

#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("event has no installation; cannot authenticate as the GitHub App")]
    MissingInstallation,
    #[error("invalid GitHub App private key")]
    PrivateKey(#[source] jsonwebtoken::errors::Error),
    #[error("could not set up GitHub client")]
    Client(#[source] octocrab::Error),
    #[error("could not get an access token for installation {installation_id}")]
    AccessToken {
        installation_id: u64,
        #[source]
        source: octocrab::Error,
    },
}

#[derive(serde::Deserialize)]
struct AccessToken {
    token: String,
}

/// A GitHub client together with the raw token it uses, which also
/// authorizes archive downloads.
pub struct Session {
    pub crab: Octocrab,
    pub token: String,
}

impl Session {
    pub async fn connect(config: &Config, installation_id: Option<u64>) -> Result<Self, SessionError> {
        let token = match &config.credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::App { id, private_key } => {
                let installation_id = installation_id.ok_or(SessionError::MissingInstallation)?;
                let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.as_bytes())
                    .map_err(SessionError::PrivateKey)?;
                let app = Octocrab::builder()
                    .base_uri(config.api_url.as_str())
                    .map_err(SessionError::Client)?
                    .app(AppId(*id), key)
                    .build()
                    .map_err(SessionError::Client)?;
                let AccessToken { token } = app
                    .post(
                        format!("/app/installations/{installation_id}/access_tokens"),
                        None::<&()>,
                    )
                    .await
                    .map_err(|source| SessionError::AccessToken {
                        installation_id,
                        source,
                    })?;
                tracing::info!("authenticated as installation {installation_id}");
                token
            }
        };

        let crab = Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .map_err(SessionError::Client)?
            .personal_token(token.clone())
            .build()
            .map_err(SessionError::Client)?;
        Ok(Self { crab, token })
    }
}
