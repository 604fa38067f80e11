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

//! Creating check runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use octocrab::Octocrab;
use thiserror::Error;

use crate::octocrab_extra::models::checks::{
    CheckRunConclusion, CheckRunOutputArgument, CheckRunStatus,
};
use crate::octocrab_extra::OctocrabExt;

#[derive(Error, Diagnostic, Debug)]
#[error("could not create check run '{name}' in {owner}/{repo}")]
pub struct ChecksError {
    pub owner: String,
    pub repo: String,
    pub name: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// A check run as it is sent to GitHub.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckRunRequest {
    pub name: String,
    pub head_sha: String,
    pub status: CheckRunStatus,
    pub output: Option<CheckRunOutputArgument>,
    pub conclusion: Option<CheckRunConclusion>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRunRequest {
    /// A `body` becomes the output summary, titled with the run's name.
    /// Completed runs are stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        head_sha: impl Into<String>,
        status: CheckRunStatus,
        body: Option<String>,
        conclusion: Option<CheckRunConclusion>,
    ) -> Self {
        let name = name.into();
        let output = body.map(|body| CheckRunOutputArgument::new(name.clone(), body));
        let completed_at = (status == CheckRunStatus::Completed).then(Utc::now);
        Self {
            name,
            head_sha: head_sha.into(),
            status,
            output,
            conclusion,
            completed_at,
        }
    }
}

#[async_trait]
pub trait ChecksApi: Send + Sync {
    async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        request: CheckRunRequest,
    ) -> Result<(), ChecksError>;
}

pub struct GitHubChecks {
    crab: Octocrab,
}

impl GitHubChecks {
    pub fn new(crab: Octocrab) -> Self {
        Self { crab }
    }
}

#[async_trait]
impl ChecksApi for GitHubChecks {
    async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        request: CheckRunRequest,
    ) -> Result<(), ChecksError> {
        let CheckRunRequest {
            name,
            head_sha,
            status,
            output,
            conclusion,
            completed_at,
        } = request;

        let checks = self.crab.check_runs(owner, repo);
        let mut builder = checks.create_check_run(name.as_str(), head_sha).status(status);
        if let Some(output) = output {
            builder = builder.output(output);
        }
        if let Some(conclusion) = conclusion {
            builder = builder.conclusion(conclusion);
        }
        if let Some(completed_at) = completed_at {
            builder = builder.completed_at(completed_at);
        }

        let check_run = builder.send().await.map_err(|source| ChecksError {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            name: name.clone(),
            source: Box::new(source),
        })?;
        tracing::debug!(id = ?check_run.id, status = ?check_run.status, "created check run {name}");
        Ok(())
    }
}
