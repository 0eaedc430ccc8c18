use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "leads",
    version,
    about = "Stream matched leads for a set of campaigns and page through them"
)]
/// Command-line arguments accepted by the `leads` binary.
pub(crate) struct CliArgs {
    /// RON configuration file; defaults to ./leads.ron when present.
    #[arg(short, long = "config", value_name = "FILE", env = "LEADS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the matching service.
    #[arg(long, value_name = "URL", env = "LEADS_BASE_URL")]
    pub base_url: Option<String>,

    /// Campaign identifier to process; repeat for several.
    #[arg(long = "campaign", value_name = "ID")]
    pub campaigns: Vec<String>,

    /// Results shown per page.
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Skip the live status channel and fetch results in one request.
    #[arg(long)]
    pub no_stream: bool,

    /// Mirror log output to stderr.
    #[arg(long)]
    pub log_terminal: bool,

    /// Print the resolved configuration as RON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub(crate) fn parse_cli() -> CliArgs {
    CliArgs::parse()
}
