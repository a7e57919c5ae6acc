use anyhow::Result;
use clap::Parser;
use datamate_console::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let context = logging::detect_context(args.json);
    let config_file = args.config_file();
    let _logging = logging::init(context, Some(&config_file))?;

    tracing::debug!("datamate {} starting", datamate_console::VERSION);
    cli::run(args).await
}
