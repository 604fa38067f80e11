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

//! Additions to [`octocrab`] for the parts of the checks API it does not
//! cover yet.

use octocrab::Octocrab;

pub mod models {
    pub mod checks;
}
mod checks;

pub use checks::{CheckHandler, CreateCheckRunBuilder};

/// `octocrab` already has a `checks` method with its own parameter types, so
/// this one goes by a different name.
pub trait OctocrabExt {
    fn check_runs(&self, owner: impl Into<String>, repo: impl Into<String>) -> CheckHandler<'_>;
}

impl OctocrabExt for Octocrab {
    fn check_runs(&self, owner: impl Into<String>, repo: impl Into<String>) -> CheckHandler<'_> {
        CheckHandler::new(self, owner.into(), repo.into())
    }
}
