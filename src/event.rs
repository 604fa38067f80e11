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

//! GitHub webhook events as delivered through SNS.

use std::fmt;

use aws_lambda_events::event::sns::SnsEvent;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

pub const GITHUB_API: &str = "https://api.github.com";

#[derive(Error, Diagnostic, Debug)]
pub enum EventError {
    #[error("SNS notification contains no records")]
    NoRecords,
    #[error("SNS notification has no subject; cannot tell the GitHub event type")]
    MissingSubject,
    #[error("could not parse {kind} payload")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} payload has no head commit")]
    MissingHead { kind: EventKind },
    #[error("repository name '{0}' is not of the form owner/repo")]
    RepositoryName(String),
}

/// The GitHub event type, taken from the `X-GitHub-Event` header value that
/// the webhook forwarder puts into the SNS subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    CheckSuite,
    PullRequest,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckSuite => "check_suite",
            Self::PullRequest => "pull_request",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "check_suite" => Self::CheckSuite,
            "pull_request" => Self::PullRequest,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Requested,
    Rerequested,
    Completed,
    Opened,
    Reopened,
    Edited,
    Synchronize,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WebhookPayload {
    pub action: Action,
    pub repository: Repository,
    #[serde(default)]
    pub check_suite: Option<Subject>,
    #[serde(default)]
    pub pull_request: Option<Subject>,
    #[serde(default)]
    pub installation: Option<Installation>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub archive_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Installation {
    pub id: u64,
}

/// The check suite or pull request an event is about.
///
/// Check suites carry `head_sha`/`head_branch`, pull requests a nested
/// `head` object. Either shape is accepted for both.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub head_sha: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head: Option<Head>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Head {
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GitHubEvent {
    pub kind: EventKind,
    pub hook: WebhookPayload,
}

impl GitHubEvent {
    pub fn parse(kind: impl Into<EventKind>, message: &str) -> Result<Self, EventError> {
        let kind = kind.into();
        let hook = serde_json::from_str(message).map_err(|source| EventError::Payload {
            kind: kind.clone(),
            source,
        })?;
        Ok(Self { kind, hook })
    }

    /// Reads the GitHub event from the first record of an SNS notification.
    pub fn from_sns(event: SnsEvent) -> Result<Self, EventError> {
        let record = event.records.into_iter().next().ok_or(EventError::NoRecords)?;
        let subject = record.sns.subject.ok_or(EventError::MissingSubject)?;
        Self::parse(subject.as_str(), &record.sns.message)
    }

    pub fn action(&self) -> Action {
        self.hook.action
    }

    /// Whether this event should produce check runs.
    pub fn requires_action(&self) -> bool {
        match self.kind {
            EventKind::CheckSuite => {
                matches!(self.hook.action, Action::Requested | Action::Rerequested)
            }
            EventKind::PullRequest => matches!(
                self.hook.action,
                Action::Opened | Action::Reopened | Action::Synchronize
            ),
            EventKind::Other(_) => false,
        }
    }

    fn subject(&self) -> Option<&Subject> {
        match self.kind {
            EventKind::CheckSuite => self.hook.check_suite.as_ref(),
            EventKind::PullRequest => self.hook.pull_request.as_ref(),
            EventKind::Other(_) => None,
        }
    }

    pub fn sha(&self) -> Result<&str, EventError> {
        let subject = self.subject();
        subject
            .and_then(|s| s.head_sha.as_deref())
            .or_else(|| subject.and_then(|s| s.head.as_ref()).map(|h| h.sha.as_str()))
            .ok_or_else(|| EventError::MissingHead {
                kind: self.kind.clone(),
            })
    }

    pub fn head_branch(&self) -> Option<&str> {
        let subject = self.subject()?;
        subject
            .head_branch
            .as_deref()
            .or_else(|| subject.head.as_ref().and_then(|h| h.git_ref.as_deref()))
    }

    pub fn full_name(&self) -> &str {
        &self.hook.repository.full_name
    }

    pub fn owner_and_repo(&self) -> Result<(&str, &str), EventError> {
        match self.full_name().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok((owner, repo)),
            _ => Err(EventError::RepositoryName(self.full_name().to_owned())),
        }
    }

    /// Tarball URL of the head commit.
    pub fn archive_url(&self) -> Result<String, EventError> {
        let sha = self.sha()?;
        Ok(self
            .hook
            .repository
            .archive_url
            .replace("{archive_format}", "tarball")
            .replace("{/ref}", &format!("/{sha}")))
    }

    pub fn check_runs_url(&self) -> String {
        format!("{GITHUB_API}/repos/{}/check-runs", self.full_name())
    }

    pub fn default_branch(&self) -> &str {
        self.hook
            .repository
            .default_branch
            .as_deref()
            .unwrap_or("master")
    }

    pub fn installation_id(&self) -> Option<u64> {
        self.hook.installation.map(|i| i.id)
    }
}
