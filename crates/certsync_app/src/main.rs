mod cli;
mod config;
mod logging;
mod run;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use engine_logging::engine_error;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::initialize(args.log_level, args.log_destination());

    let settings = config::load_settings(args.config.as_deref())?;
    match run::run(&args, &settings).await {
        Ok(code) => Ok(code),
        Err(err) => {
            engine_error!("certsync failed: {:#}", err);
            Err(err)
        }
    }
}
