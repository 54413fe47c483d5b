use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use digipost_lookup::config::cli::CliArgs;
use digipost_lookup::delivery::OutboxMailer;
use digipost_lookup::intake::{requester_from_form_body, IntakeRequest};
use digipost_lookup::registry::{CredentialProvider, EnvCredentialProvider};
use digipost_lookup::utils::logging::init_logging;
use digipost_lookup::{save_report, LookupConfig, Pipeline, ServiceplatformenClient};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    init_logging();

    let args = CliArgs::parse();
    let config = LookupConfig::try_from(&args).context("Invalid configuration")?;

    let requester = match (&args.requester, &args.form_body) {
        (Some(requester), _) => requester.clone(),
        (None, Some(form_path)) => {
            let body = std::fs::read_to_string(form_path)
                .with_context(|| format!("Failed to read form body {}", form_path.display()))?;
            requester_from_form_body(&body)?
        }
        (None, None) => anyhow::bail!("Either --requester or --form-body must be given"),
    };
    let request = IntakeRequest::from_path(requester, &args.input, args.header)?;

    let credential = EnvCredentialProvider
        .resolve(&config.service_credential_reference)
        .context("Failed to resolve registry credential")?;
    let client =
        ServiceplatformenClient::new(&config.base_url, credential, config.lookup_timeout)?;
    let mailer = OutboxMailer::new(&args.outbox)?;
    let pipeline = Pipeline::new(client, config)?;
    info!(
        "Received {} identifiers from {} for {} lookup with {} threads",
        request.identifiers.len(),
        request.requester,
        pipeline.config().channel,
        request.thread_count.unwrap_or(pipeline.config().thread_count)
    );

    let start = Instant::now();
    let table = pipeline
        .process_request(&request, &mailer)
        .await
        .context("Lookup batch failed")?;

    if let Some(output) = &args.output {
        save_report(&table, output)?;
    }

    info!(
        "Processed request for {} in {:?}: {}",
        request.requester,
        start.elapsed(),
        table.summary()
    );
    Ok(())
}
