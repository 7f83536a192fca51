use clap::Parser;
use log::{debug, LevelFilter};

mod args;
mod dashboard;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    let res = dashboard::run_dashboard(&args);

    if let Err(e) = res {
        eprintln!("Error: {}", dashboard::error_report(&e));
        std::process::exit(1);
    }
}
