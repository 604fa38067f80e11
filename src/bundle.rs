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

//! Files shipped alongside the handler: the service catalog, the getting
//! started text and the template for new configuration files.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::catalog::ServiceCatalog;

pub const CATALOG_FILE: &str = "check_runs.yml";
pub const GETTING_STARTED_FILE: &str = "getting_started.md";
pub const CONFIG_TEMPLATE_FILE: &str = "template.yml";

const EMBEDDED_CATALOG: &str = include_str!("../assets/check_runs.yml");
const EMBEDDED_GETTING_STARTED: &str = include_str!("../assets/getting_started.md");
const EMBEDDED_CONFIG_TEMPLATE: &str = include_str!("../assets/template.yml");

#[derive(Error, Diagnostic, Debug)]
pub enum BundleError {
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service catalog {origin}")]
    #[diagnostic(help("the catalog must be a YAML mapping of check name to URL"))]
    Catalog {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Clone, Debug)]
pub struct Bundle {
    pub catalog: ServiceCatalog,
    pub getting_started: String,
    pub config_template: String,
}

impl Bundle {
    /// The copies compiled into the binary.
    pub fn embedded() -> Result<Self, BundleError> {
        Ok(Self {
            catalog: parse_catalog(EMBEDDED_CATALOG, "(embedded)")?,
            getting_started: EMBEDDED_GETTING_STARTED.to_owned(),
            config_template: EMBEDDED_CONFIG_TEMPLATE.to_owned(),
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self, BundleError> {
        let catalog_path = dir.join(CATALOG_FILE);
        let catalog = read(&catalog_path)?;
        Ok(Self {
            catalog: parse_catalog(&catalog, &catalog_path.display().to_string())?,
            getting_started: read(&dir.join(GETTING_STARTED_FILE))?,
            config_template: read(&dir.join(CONFIG_TEMPLATE_FILE))?,
        })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self, BundleError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }
}

fn read(path: &Path) -> Result<String, BundleError> {
    std::fs::read_to_string(path).map_err(|source| BundleError::Read {
        path: path.to_owned(),
        source,
    })
}

fn parse_catalog(s: &str, origin: &str) -> Result<ServiceCatalog, BundleError> {
    ServiceCatalog::from_yaml(s).map_err(|source| BundleError::Catalog {
        origin: origin.to_owned(),
        source,
    })
}
