use anyhow::Result;
use dincharya::commands::Cli;
use dincharya::libs::logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logger::init();
    Cli::menu().await
}
