//! gen_nvram_zone entry point
//!
//! All logic is delegated to the CLI module.

use nvzone::cli;

fn main() {
    std::process::exit(cli::run());
}
