use clap::Parser;
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    host: String,
    /// Server port
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to {}:{}", args.host, args.port);
    let client = Client::connect(&args.host, args.port).await?;

    println!("Commands: 'show', 'update <row> <col> <value>', 'exit'");
    client.run().await?;

    Ok(())
}
