use clap::Parser;
use highland_planner::cli::Cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
