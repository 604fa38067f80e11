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

use chrono::{DateTime, Utc};
use serde::Serializer;

use crate::octocrab_extra::models::checks::{
    CheckRun, CheckRunConclusion, CheckRunOutputArgument, CheckRunStatus,
};

/// `completed_at` is sent with whole seconds only.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(serde::Serialize)]
pub struct CreateCheckRunBuilder<'octo, 'r> {
    #[serde(skip)]
    handler: &'r super::CheckHandler<'octo>,
    name: String,
    head_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CheckRunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<CheckRunConclusion>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<CheckRunOutputArgument>,
}

impl<'octo, 'r> CreateCheckRunBuilder<'octo, 'r> {
    pub fn new(handler: &'r super::CheckHandler<'octo>, name: String, head_sha: String) -> Self {
        Self {
            handler,
            name,
            head_sha,
            status: None,
            conclusion: None,
            completed_at: None,
            output: None,
        }
    }

    /// The current status.
    /// Default: [`CheckRunStatus::Queued`]
    pub fn status(mut self, status: impl Into<CheckRunStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The final conclusion of the check. **Required if you provide
    /// [`completed_at`](Self::completed_at) or a status of
    /// [`CheckRunStatus::Completed`]**.
    pub fn conclusion(mut self, conclusion: impl Into<CheckRunConclusion>) -> Self {
        self.conclusion = Some(conclusion.into());
        self
    }

    /// The time that the check completed.
    pub fn completed_at(mut self, completed_at: impl Into<DateTime<Utc>>) -> Self {
        self.completed_at = Some(completed_at.into());
        self
    }

    /// Check runs can accept a variety of data in the `output` object,
    /// including a `title` and `summary`.
    pub fn output(mut self, output: impl Into<CheckRunOutputArgument>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Send the actual request.
    pub async fn send(self) -> octocrab::Result<CheckRun> {
        let route = self.handler.route();
        self.handler.crab.post(route, Some(&self)).await
    }
}

fn serialize_timestamp<S>(timestamp: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(timestamp) => serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use octocrab::Octocrab;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::octocrab_extra::OctocrabExt;

    #[tokio::test]
    async fn queued_run_only_carries_name_sha_and_status() {
        let crab = Octocrab::default();
        let checks = crab.check_runs("baxterthehacker", "public-repo");
        let builder = checks
            .create_check_run("pycodestyle", "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c")
            .status(CheckRunStatus::Queued);

        assert_eq!(
            serde_json::to_value(&builder).unwrap(),
            json!({
                "name": "pycodestyle",
                "head_sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c",
                "status": "queued",
            })
        );
    }

    #[tokio::test]
    async fn completed_at_has_no_fractional_seconds() {
        let crab = Octocrab::default();
        let checks = crab.check_runs("baxterthehacker", "public-repo");
        let completed_at = Utc
            .with_ymd_and_hms(2018, 5, 4, 1, 14, 52)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(345))
            .unwrap();
        let builder = checks
            .create_check_run("Getting Started", "0d1a26e")
            .status(CheckRunStatus::Completed)
            .conclusion(CheckRunConclusion::Neutral)
            .completed_at(completed_at)
            .output(CheckRunOutputArgument::new("Getting Started", "hello world"));

        let body = serde_json::to_value(&builder).unwrap();
        assert_eq!(body["completed_at"], "2018-05-04T01:14:52Z");
        assert_eq!(body["conclusion"], "neutral");
        assert_eq!(
            body["output"],
            json!({"title": "Getting Started", "summary": "hello world"})
        );
    }

    #[tokio::test]
    async fn route_points_at_repository_check_runs() {
        let crab = Octocrab::default();
        let checks = crab.check_runs("baxterthehacker", "public-repo");
        let route = checks.route();
        assert!(route.starts_with('/'), "{route}");
        assert_eq!(route, "/repos/baxterthehacker/public-repo/check-runs");
    }
}
