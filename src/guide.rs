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

//! The "Getting Started" check run posted when a repository asks for none of
//! the supported checks.

use crate::catalog::ServiceCatalog;

pub const GETTING_STARTED: &str = "Getting Started";

/// Builds the guide body. `template` must reference the `[template]` link
/// (e.g. `[click here][template]`), which is defined at the end.
pub fn getting_started_guide(
    template: &str,
    catalog: &ServiceCatalog,
    new_config_link: &str,
) -> String {
    let service_links = catalog
        .iter()
        .map(|(title, href)| format!("*   [{title}]({href})"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut body = template.to_owned();
    body.push_str(&service_links);
    body.push_str(&format!("\n\n[template]: {new_config_link}\n"));
    body
}

/// Link to GitHub's "create new file" page pre-filled with a config file.
pub fn new_config_link(full_name: &str, branch: &str, filename: &str, template: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("filename", filename)
        .append_pair("value", template)
        .finish();
    format!("https://github.com/{full_name}/new/{branch}?{query}")
}
