mod cli;
mod content;

fn main() {
    // Pass --verbose for per-object debug logging
    let args: Vec<String> = std::env::args().collect();
    let level = if args.iter().any(|arg| arg == "--verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
    cli::run_cli_tests();
}
