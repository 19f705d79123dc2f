use crate::infra::CatalogArgs;
use crate::lookup::{
    run_check, run_lookup, run_show, run_summary, CheckArgs, LookupArgs, ShowArgs, SummaryArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tenderforce::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "tenderforce-api",
    about = "Resolve CPV codes to EED and GPP procurement obligations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List the obligations that apply to a CPV code
    Lookup(LookupArgs),
    /// Print the obligation summary for a CPV code as JSON
    Summary(SummaryArgs),
    /// Print one obligation record
    Show(ShowArgs),
    /// Validate the catalog and report dangling or unreachable obligations
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) catalog: CatalogArgs,
}

pub(crate) async fn run() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await.map(|()| ExitCode::SUCCESS),
        Command::Lookup(args) => run_lookup(args),
        Command::Summary(args) => run_summary(args),
        Command::Show(args) => run_show(args),
        Command::Check(args) => run_check(args),
    }
}
