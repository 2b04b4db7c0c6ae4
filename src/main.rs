use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod authority;
mod config;
mod extractor;
mod feed;
mod output;
mod rank;
mod scoring;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "feedrank", about = "Rank recent feed articles by relevance, authority and readability")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Rank(rank::RankCmd),
    Authority(authority::cmd::AuthorityCmd),
    Readability(scoring::cmd::ReadabilityCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // stderr logging; respects RUST_LOG and FEEDRANK_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Rank(args) => rank::run(args).await?,
        Commands::Authority(args) => authority::cmd::run(args).await?,
        Commands::Readability(args) => scoring::cmd::run(args).await?,
    }

    Ok(())
}
