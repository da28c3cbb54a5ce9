use clap::Parser;
use std::sync::Arc;

use exchange::Exchange;

/// FIX matching engine exchange server.
#[derive(Parser, Debug)]
#[command(name = "exchange")]
struct Args {
    /// TCP port to listen on
    #[arg(long, default_value_t = 4050)]
    port: u16,

    /// Instrument to register before start (repeatable)
    #[arg(long = "instrument", value_name = "TICKER")]
    instruments: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let exchange = Arc::new(Exchange::new());
    for ticker in &args.instruments {
        exchange.add_instrument(ticker)?;
        tracing::info!(%ticker, "registered instrument");
    }

    let server = Arc::clone(&exchange);
    tokio::select! {
        result = server.start(args.port) => result?,
        _ = tokio::signal::ctrl_c() => exchange.stop(),
    }

    Ok(())
}
