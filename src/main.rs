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

use aws_lambda_events::event::sns::SnsEvent;
use fussyfox_suite::bundle::Bundle;
use fussyfox_suite::config::Config;
use lambda_runtime::{service_fn, LambdaEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .without_time()
        .init();

    let config = Config::from_env()?;
    let bundle = Bundle::load(config.bundle_dir.as_deref())?;
    tracing::info!(
        credentials = ?config.credentials,
        services = bundle.catalog.len(),
        "starting"
    );

    let (config, bundle) = (&config, &bundle);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<SnsEvent>| async move {
        function_handler(config, bundle, event).await
    }))
    .await
    .map_err(|err| miette::miette!("{err}"))
}

async fn function_handler(
    config: &Config,
    bundle: &Bundle,
    event: LambdaEvent<SnsEvent>,
) -> Result<(), lambda_runtime::Error> {
    match fussyfox_suite::handle_notification(config, bundle, event.payload).await {
        Ok(outcome) => {
            tracing::info!(?outcome, "done");
            Ok(())
        }
        Err(err) => {
            let report = miette::Report::new(err);
            tracing::error!("{report:?}");
            Err(report.to_string().into())
        }
    }
}
