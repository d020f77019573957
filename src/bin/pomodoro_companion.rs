//! Shim binary that calls into the `pomodoro_companion` library's `inner_main`.
use clap::Parser as _;
use eyre::Result;
use pomodoro_companion::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Delegate to library entrypoint
    pomodoro_companion::inner_main(Cli::parse()).await
}
