mod args;
mod election;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::election::{run_session, SessionOptions};

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    info!("args: {:?}", args);

    let opts = SessionOptions {
        config_path: args.config,
        input_path: args.input,
        input_type: args.input_type,
        out_path: args.out,
        reference_path: args.reference,
        live: args.live,
        refresh_seconds: args.refresh_seconds,
    };

    if let Err(e) = run_session(&opts) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
