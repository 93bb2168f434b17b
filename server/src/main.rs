use clap::Parser;
use log::info;
use server::board::Board;
use server::network::Server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TCP port to listen on
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let board = Board::generate(&mut rand::thread_rng());
    println!("Sudoku board created:\n{}", board.render());

    let server = Server::bind(("0.0.0.0", args.port), board).await?;
    info!("Accepting clients on port {}", args.port);

    server.run().await?;
    Ok(())
}
