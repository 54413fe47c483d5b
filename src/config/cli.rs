//! Command line arguments for the `digipost-lookup` binary.
//!
//! Every flag can also be supplied through the environment (or a `.env`
//! file loaded before parsing).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::LookupConfig;
use crate::error::Result;
use crate::intake::HeaderRow;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "digipost-lookup",
    version,
    about = "Look up Digital Post / NemSMS registration for a list of CPR and CVR numbers"
)]
pub struct CliArgs {
    /// Identifier list: an `.xlsx` workbook or a text file with one
    /// identifier per line (first column of delimited lines)
    #[arg(long, short = 'i', env = "DIGIPOST_INPUT")]
    pub input: PathBuf,

    /// How to treat the first row of the identifier list
    #[arg(long, value_enum, env = "DIGIPOST_HEADER", default_value_t = HeaderRow::Detect)]
    pub header: HeaderRow,

    /// Address the report is sent to
    #[arg(long, short = 'r', env = "DIGIPOST_REQUESTER", conflicts_with = "form_body")]
    pub requester: Option<String>,

    /// Intake form text containing an `E-mail:` line with the requester
    #[arg(long, env = "DIGIPOST_FORM_BODY")]
    pub form_body: Option<PathBuf>,

    /// Number of concurrent registry lookups
    #[arg(long, short = 't', env = "DIGIPOST_THREADS")]
    pub threads: Option<usize>,

    /// Channel to query: `digitalpost` or `nemsms`
    #[arg(long, env = "DIGIPOST_CHANNEL")]
    pub channel: Option<String>,

    /// Registry base URL
    #[arg(long, env = "DIGIPOST_BASE_URL")]
    pub base_url: Option<String>,

    /// Reference to the registry credential
    #[arg(long, env = "DIGIPOST_CREDENTIAL")]
    pub credential: Option<String>,

    /// Per-lookup timeout in seconds
    #[arg(long, env = "DIGIPOST_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Sender address of the report mail
    #[arg(long, env = "DIGIPOST_SENDER")]
    pub sender: Option<String>,

    /// Directory the outgoing mail is dropped into
    #[arg(long, env = "DIGIPOST_OUTBOX", default_value = "outbox")]
    pub outbox: PathBuf,

    /// Also write the spreadsheet to this path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TryFrom<&CliArgs> for LookupConfig {
    type Error = crate::error::DigipostError;

    fn try_from(args: &CliArgs) -> Result<Self> {
        let mut config = Self::default().with_progress(!args.no_progress);
        if let Some(threads) = args.threads {
            config = config.with_thread_count(threads);
        }
        if let Some(channel) = &args.channel {
            config = config.with_channel(channel.parse()?);
        }
        if let Some(base_url) = &args.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(credential) = &args.credential {
            config = config.with_credential_reference(credential.as_str());
        }
        if let Some(secs) = args.timeout_secs {
            config = config.with_lookup_timeout(Duration::from_secs(secs));
        }
        if let Some(sender) = &args.sender {
            config = config.with_sender(sender.as_str());
        }
        config.validate()?;
        Ok(config)
    }
}
