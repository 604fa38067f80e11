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

//! AWS Lambda handler that answers GitHub `check_suite` and `pull_request`
//! events with one check run per linter the repository asked for.
//!
//! The repository lists the linters it wants in a `.fussyfox.yml` (or
//! `.checks.yml`, optionally in `.github/`, YAML or JSON). Every listed name
//! that is also in the bundled service catalog gets a queued check run. A
//! repository asking for nothing supported gets a "Getting Started" guide
//! instead.

use aws_lambda_events::event::sns::SnsEvent;
use miette::Diagnostic;
use thiserror::Error;

pub mod bundle;
pub mod catalog;
pub mod checks;
pub mod config;
pub mod event;
pub mod guide;
pub mod octocrab_extra;
pub mod reconcile;
pub mod repo_config;
pub mod session;
pub mod source;

use bundle::Bundle;
use checks::{ChecksError, GitHubChecks};
use config::Config;
use event::{EventError, GitHubEvent};
use reconcile::{CheckRunReconciler, Outcome};
use session::{Session, SessionError};
use source::{DownloadError, TarballDownloader};

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Checks(#[from] ChecksError),
}

/// Handles one SNS notification carrying a GitHub webhook event.
pub async fn handle_notification(
    config: &Config,
    bundle: &Bundle,
    notification: SnsEvent,
) -> Result<Outcome, Error> {
    let event = GitHubEvent::from_sns(notification)?;
    if !event.requires_action() {
        tracing::info!(kind = %event.kind, action = ?event.action(), "no action required");
        return Ok(Outcome::Skipped);
    }

    let session = Session::connect(config, event.installation_id()).await?;
    let code = TarballDownloader::new(session.token.clone());
    let checks = GitHubChecks::new(session.crab);

    CheckRunReconciler::new(bundle, &code, &checks)
        .handle(&event)
        .await
}
