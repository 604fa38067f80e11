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

//! The repository's own list of checks it wants to run.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

/// File name a new configuration is created under.
pub const CONFIG_FILE_DEFAULT: &str = ".fussyfox.yml";

pub fn is_config_file_name(name: &str) -> bool {
    CONFIG_FILE_REGEX.with(|r| r.is_match(name))
}

/// Returns the first file below `root` whose name looks like a checks
/// configuration. Within a directory, files are looked at before any
/// subdirectory, each in file name order, so a config at the top of the
/// repository wins over one nested deeper.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(is_config_file_name)
        })
        .map(|entry| entry.into_path())
}

/// Returns the check names listed in the tree's config file, or `None` if
/// there is no config file or it cannot be read as a list of names.
///
/// YAML is a superset of JSON, so both formats go through `serde_yaml`.
pub fn load_config(root: &Path) -> Option<Vec<String>> {
    let config_path = find_config_file(root)?;
    tracing::info!("Reading config: {}", config_path.display());
    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) => {
            tracing::error!("could not read {}: {err}", config_path.display());
            return None;
        }
    };
    match serde_yaml::from_str(&content) {
        Ok(names) => Some(names),
        Err(err) => {
            tracing::warn!("ignoring malformed config {}: {err}", config_path.display());
            None
        }
    }
}

thread_local! {
    static CONFIG_FILE_REGEX: Regex = Regex::new(r"(?i)^\.?(checks|fussyfox)\.(yml|yaml|json)$").unwrap();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture_tree() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tree")
    }

    #[test]
    fn config_file_names() {
        for name in [
            ".checks.yml",
            "checks.yaml",
            ".fussyfox.yml",
            "fussyfox.json",
            ".FussyFox.YML",
        ] {
            assert!(is_config_file_name(name), "{name}");
        }
        for name in [
            "checks.toml",
            ".checks.yml.bak",
            ".github/checks.yml",
            "my-checks.yml",
            "..checks.yml",
            "README.md",
        ] {
            assert!(!is_config_file_name(name), "{name}");
        }
    }

    #[test]
    fn load_config_from_tree() {
        assert_eq!(
            load_config(&fixture_tree()),
            Some(vec!["pycodestyle".to_owned(), "pyflakes".to_owned()])
        );
    }

    #[test]
    fn load_config_missing() {
        assert_eq!(load_config(Path::new("does_not_exist")), None);

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "hello").unwrap();
        assert_eq!(load_config(dir.path()), None);
    }

    #[test]
    fn config_inside_github_directory_of_archive_root() {
        let dir = tempfile::tempdir().unwrap();
        let github = dir.path().join("public-repo-0d1a26e/.github");
        std::fs::create_dir_all(&github).unwrap();
        std::fs::write(github.join("checks.json"), r#"["flake8"]"#).unwrap();

        assert_eq!(find_config_file(dir.path()), Some(github.join("checks.json")));
        assert_eq!(load_config(dir.path()), Some(vec!["flake8".to_owned()]));
    }

    #[test]
    fn root_config_wins_over_nested_one() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("public-repo-0d1a26e");
        let templates = repo.join(".buildkite/templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(repo.join(".checks.yml"), "[pycodestyle]\n").unwrap();
        std::fs::write(templates.join("checks.yml"), "[bandit]\n").unwrap();

        assert_eq!(find_config_file(dir.path()), Some(repo.join(".checks.yml")));
        assert_eq!(load_config(dir.path()), Some(vec!["pycodestyle".to_owned()]));
    }

    #[test]
    fn github_directory_wins_over_deeper_directories() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("public-repo-0d1a26e");
        std::fs::create_dir_all(repo.join(".github")).unwrap();
        std::fs::create_dir_all(repo.join("docs/examples/nested")).unwrap();
        std::fs::write(repo.join(".github/fussyfox.yaml"), "- pyflakes\n").unwrap();
        std::fs::write(repo.join("docs/examples/nested/.checks.yml"), "- bandit\n").unwrap();

        assert_eq!(load_config(dir.path()), Some(vec!["pyflakes".to_owned()]));
    }

    #[test]
    fn malformed_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".checks.yml"), "pycodestyle: true\n").unwrap();
        assert_eq!(load_config(dir.path()), None);
    }
}
