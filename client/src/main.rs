use clap::Parser;
use client::network::Player;
use client::spectator::Spectator;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9999")]
    server: String,

    /// Watch the game instead of playing Black
    #[arg(long)]
    spectate: bool,

    /// Countdown budget per side, in seconds
    #[arg(short, long, default_value = "600")]
    clock: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    if args.spectate {
        info!("Spectating game at {}", args.server);
        let mut spectator = Spectator::connect(&args.server).await?;
        spectator.run().await?;
    } else {
        info!("Joining game at {} as Black", args.server);
        let mut player = Player::connect(&args.server, args.clock as f32).await?;
        player.run().await?;
    }

    Ok(())
}
