mod cli;
mod config;
mod constants;
mod domain;
mod error;
mod keys;
mod logging;
mod storage;

fn main() {
    cli::run_cli();
}
