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

//! Turns a check suite or pull request event into check runs.

use std::collections::BTreeSet;

use crate::bundle::Bundle;
use crate::checks::{CheckRunRequest, ChecksApi};
use crate::event::GitHubEvent;
use crate::guide::{self, GETTING_STARTED};
use crate::octocrab_extra::models::checks::{CheckRunConclusion, CheckRunStatus};
use crate::repo_config::{self, CONFIG_FILE_DEFAULT};
use crate::source::CodeProvider;
use crate::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event does not call for any check runs.
    Skipped,
    /// One queued check run was created per name.
    Created(BTreeSet<String>),
    /// Nothing matched, so the getting started guide was posted.
    GettingStarted,
}

pub struct CheckRunReconciler<'a, C: ?Sized, A: ?Sized> {
    bundle: &'a Bundle,
    code: &'a C,
    checks: &'a A,
}

impl<'a, C, A> CheckRunReconciler<'a, C, A>
where
    C: CodeProvider + ?Sized,
    A: ChecksApi + ?Sized,
{
    pub fn new(bundle: &'a Bundle, code: &'a C, checks: &'a A) -> Self {
        Self {
            bundle,
            code,
            checks,
        }
    }

    pub async fn handle(&self, event: &GitHubEvent) -> Result<Outcome, Error> {
        if !event.requires_action() {
            tracing::info!(kind = %event.kind, action = ?event.action(), "no action required");
            return Ok(Outcome::Skipped);
        }

        let tree = self.code.download(&event.archive_url()?).await?;
        let config: BTreeSet<String> = repo_config::load_config(tree.path())
            .unwrap_or_default()
            .into_iter()
            .collect();

        let catalog = &self.bundle.catalog;
        tracing::debug!(?config, "desired checks");
        tracing::debug!(supported = ?catalog.names().collect::<Vec<_>>(), "supported checks");

        let check_runs = catalog.supported(config.iter().map(String::as_str));
        if check_runs.is_empty() {
            let body = self.getting_started_guide(event);
            self.create_check_run(
                event,
                GETTING_STARTED,
                CheckRunStatus::Completed,
                Some(body),
                Some(CheckRunConclusion::Neutral),
            )
            .await?;
            return Ok(Outcome::GettingStarted);
        }

        for name in &check_runs {
            self.create_check_run(event, name, CheckRunStatus::Queued, None, None)
                .await?;
        }
        Ok(Outcome::Created(check_runs))
    }

    pub fn getting_started_guide(&self, event: &GitHubEvent) -> String {
        let link = guide::new_config_link(
            event.full_name(),
            event.default_branch(),
            CONFIG_FILE_DEFAULT,
            &self.bundle.config_template,
        );
        guide::getting_started_guide(&self.bundle.getting_started, &self.bundle.catalog, &link)
    }

    pub async fn create_check_run(
        &self,
        event: &GitHubEvent,
        name: &str,
        status: CheckRunStatus,
        body: Option<String>,
        conclusion: Option<CheckRunConclusion>,
    ) -> Result<(), Error> {
        tracing::info!("creating check run: {name}");
        let (owner, repo) = event.owner_and_repo()?;
        let request = CheckRunRequest::new(name, event.sha()?, status, body, conclusion);
        self.checks.create_check_run(owner, repo, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::ServiceCatalog;
    use crate::checks::ChecksError;
    use crate::event::Action;
    use crate::source::{DownloadError, SourceTree};

    const CHECK_SUITE: &str = include_str!("../tests/fixtures/check_suite_event.json");
    const PULL_REQUEST: &str = include_str!("../tests/fixtures/pull_request_event.json");
    const SHA: &str = "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c";

    struct LocalCode {
        root: PathBuf,
        downloads: Mutex<Vec<String>>,
    }

    impl LocalCode {
        fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: root.into(),
                downloads: Mutex::new(Vec::new()),
            }
        }

        fn fixture() -> Self {
            Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tree"))
        }
    }

    #[async_trait]
    impl CodeProvider for LocalCode {
        async fn download(&self, archive_url: &str) -> Result<SourceTree, DownloadError> {
            self.downloads.lock().unwrap().push(archive_url.to_owned());
            Ok(SourceTree::from_path(&self.root))
        }
    }

    #[derive(Default)]
    struct RecordingChecks {
        requests: Mutex<Vec<(String, String, CheckRunRequest)>>,
        fail: bool,
    }

    impl RecordingChecks {
        fn names(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, r)| r.name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChecksApi for RecordingChecks {
        async fn create_check_run(
            &self,
            owner: &str,
            repo: &str,
            request: CheckRunRequest,
        ) -> Result<(), ChecksError> {
            if self.fail {
                return Err(ChecksError {
                    owner: owner.to_owned(),
                    repo: repo.to_owned(),
                    name: request.name,
                    source: "422 Unprocessable Entity".into(),
                });
            }
            self.requests
                .lock()
                .unwrap()
                .push((owner.to_owned(), repo.to_owned(), request));
            Ok(())
        }
    }

    fn bundle(catalog: &[(&str, &str)]) -> Bundle {
        Bundle {
            catalog: catalog.iter().copied().collect::<ServiceCatalog>(),
            getting_started: "You can [click here][template] to add a config.\n\n".to_owned(),
            config_template: "- pycodestyle\n".to_owned(),
        }
    }

    fn check_suite() -> GitHubEvent {
        GitHubEvent::parse("check_suite", CHECK_SUITE).unwrap()
    }

    #[tokio::test]
    async fn creates_one_queued_run_per_supported_check() {
        let bundle = bundle(&[
            ("pycodestyle", "https://pycodestyle.pycqa.org/"),
            ("bandit", "https://github.com/PyCQA/bandit"),
        ]);
        let code = LocalCode::fixture();
        let checks = RecordingChecks::default();

        let outcome = CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&check_suite())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Created(BTreeSet::from(["pycodestyle".to_owned()]))
        );
        assert_eq!(
            *code.downloads.lock().unwrap(),
            [format!("https://api.github.com/repos/baxterthehacker/public-repo/tarball/{SHA}")]
        );
        let requests = checks.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (owner, repo, request) = &requests[0];
        assert_eq!((owner.as_str(), repo.as_str()), ("baxterthehacker", "public-repo"));
        assert_eq!(request.name, "pycodestyle");
        assert_eq!(request.head_sha, SHA);
        assert_eq!(request.status, CheckRunStatus::Queued);
        assert_eq!(request.output, None);
        assert_eq!(request.completed_at, None);
    }

    #[tokio::test]
    async fn pull_request_creates_all_matches() {
        let bundle = bundle(&[
            ("pycodestyle", "https://pycodestyle.pycqa.org/"),
            ("pyflakes", "https://github.com/PyCQA/pyflakes"),
        ]);
        let code = LocalCode::fixture();
        let checks = RecordingChecks::default();
        let event = GitHubEvent::parse("pull_request", PULL_REQUEST).unwrap();

        CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&event)
            .await
            .unwrap();

        let mut names = checks.names();
        names.sort();
        assert_eq!(names, ["pycodestyle", "pyflakes"]);
    }

    #[tokio::test]
    async fn getting_started_when_nothing_matches() {
        let bundle = bundle(&[("example", "https://example.com/")]);
        let code = LocalCode::fixture();
        let checks = RecordingChecks::default();

        let outcome = CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&check_suite())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::GettingStarted);
        let requests = checks.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (_, _, request) = &requests[0];
        assert_eq!(request.name, "Getting Started");
        assert_eq!(request.status, CheckRunStatus::Completed);
        assert_eq!(request.conclusion, Some(CheckRunConclusion::Neutral));
        assert!(request.completed_at.is_some());
        let output = request.output.as_ref().unwrap();
        assert_eq!(output.title, "Getting Started");
        assert!(output.summary.contains("*   [example](https://example.com/)"));
        assert!(output.summary.contains("[click here][template]"));
        assert!(output
            .summary
            .contains("[template]: https://github.com/baxterthehacker/public-repo/new/master?"));
    }

    #[tokio::test]
    async fn getting_started_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle(&[("pycodestyle", "https://pycodestyle.pycqa.org/")]);
        let code = LocalCode::new(dir.path());
        let checks = RecordingChecks::default();

        let outcome = CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&check_suite())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::GettingStarted);
        assert_eq!(checks.names(), ["Getting Started"]);
    }

    #[tokio::test]
    async fn unsupported_action_does_nothing() {
        let bundle = bundle(&[("pycodestyle", "https://pycodestyle.pycqa.org/")]);
        let code = LocalCode::fixture();
        let checks = RecordingChecks::default();
        let mut event = check_suite();
        event.hook.action = Action::Other;

        let outcome = CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&event)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Skipped);
        assert!(code.downloads.lock().unwrap().is_empty());
        assert!(checks.names().is_empty());
    }

    #[tokio::test]
    async fn failed_check_run_is_fatal() {
        let bundle = bundle(&[("pycodestyle", "https://pycodestyle.pycqa.org/")]);
        let code = LocalCode::fixture();
        let checks = RecordingChecks {
            fail: true,
            ..Default::default()
        };

        let result = CheckRunReconciler::new(&bundle, &code, &checks)
            .handle(&check_suite())
            .await;

        assert!(matches!(result, Err(Error::Checks(_))));
    }
}
