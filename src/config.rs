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

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::event::GITHUB_API;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("no GitHub credentials configured")]
    #[diagnostic(help("set GITHUB_TOKEN, or GITHUB_APP_ID and GITHUB_PRIVATE_KEY"))]
    MissingCredentials,
    #[error("GITHUB_APP_ID must be a number, got '{0}'")]
    AppId(String),
    #[error("GITHUB_APP_ID is set but GITHUB_PRIVATE_KEY is missing")]
    MissingPrivateKey,
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    App { id: u64, private_key: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(..)"),
            Self::App { id, .. } => f.debug_struct("App").field("id", id).finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
    pub bundle_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let credentials = match (var("GITHUB_APP_ID"), var("GITHUB_TOKEN")) {
            (Some(id), _) => Credentials::App {
                id: id.trim().parse().map_err(|_| ConfigError::AppId(id.clone()))?,
                private_key: var("GITHUB_PRIVATE_KEY").ok_or(ConfigError::MissingPrivateKey)?,
            },
            (None, Some(token)) => Credentials::Token(token),
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        Ok(Self {
            credentials,
            api_url: var("GITHUB_API_URL").unwrap_or_else(|| GITHUB_API.to_owned()),
            bundle_dir: var("FUSSYFOX_BUNDLE_DIR").map(PathBuf::from),
        })
    }
}
