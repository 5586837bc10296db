use clap::Parser;
use host::network::Host;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the host socket to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value = "9999")]
    port: u16,

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

    info!("Hosting a game as White...");

    let mut host = Host::bind(&format!("{}:{}", args.host, args.port), args.clock as f32).await?;
    host.run().await?;

    Ok(())
}
