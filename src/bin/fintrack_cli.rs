use std::process;

use fintrack_core::{cli::run_cli, config::Config, init};

fn main() {
    init();

    if let Err(err) = run_cli(&Config::default()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
