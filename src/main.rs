// src/main.rs
use clap::Parser;
use echocheckr::cli::{self, Cli};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = cli::run(&args) {
        cli::print_error(&e);
        std::process::exit(1);
    }
}
