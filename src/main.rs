use clap::Parser;
use reservation_mcp::cli::Cli;
use reservation_mcp::services::logger::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("reservation-mcp: {}", err);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            std::process::exit(2);
        }
    };

    if let Err(err) = reservation_mcp::mcp::server::run_stdio(config).await {
        eprintln!("reservation-mcp: {}", err);
        std::process::exit(1);
    }
}
