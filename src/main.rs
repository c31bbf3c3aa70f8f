use std::process;

use clap::Parser;
use log::{debug, error};

use a2a_diagram::cli::Args;

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(level) = args.log_level() {
        logger.filter_level(level);
    }
    logger.init();
    debug!(args:?; "Parsed arguments");

    if let Err(err) = a2a_diagram::cli::run(&args) {
        error!("{err:#}");
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
