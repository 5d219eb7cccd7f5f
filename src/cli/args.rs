//! CLI argument definitions using clap
//!
//! gen_nvram_zone -s <hex size> -c <property file> -o <image> [-v] [--json]

use clap::Parser;
use std::path::PathBuf;

/// Builds an NVRAM zone image from a property file
#[derive(Parser, Debug)]
#[command(name = "gen_nvram_zone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Zone size in bytes, hexadecimal (`0x` prefix optional)
    #[arg(short = 's', long, value_parser = parse_size)]
    pub size: u64,

    /// Property file to load
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Zone image to write
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Log every parsed line
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the final dump as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parses a positive hexadecimal size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let size = u64::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid hex size '{}': {}", s, e))?;
    if size == 0 {
        return Err("size must be greater than zero".to_string());
    }
    Ok(size)
}
