mod app;
mod cues;
mod host;
mod queue;
mod sim;

pub use app::{App, Args};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let app = App::new(Args::parse())?;
    app.run()?;

    Ok(())
}
