//! Command-line front end.
//!
//! Reads one `EstimateParams` JSON document from the file named by the first
//! argument (or stdin when absent or `-`) and prints the report as JSON.
//!
//! ```text
//! echo '{"hand":["Ah","Kd"],"board":["7c","8d","2s"],"opponents":3}' | odds
//! ```
//!
//! Set `RUST_LOG=debug` for simulation details on stderr.

use std::io::Read;

use anyhow::Context;
use holdem_odds::{analyze, EstimateParams};

fn main() -> anyhow::Result<()> {
    holdem_odds::init();

    let source = std::env::args().nth(1).filter(|arg| arg != "-");
    let input = match &source {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading request from {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };

    let params = EstimateParams::from_json(&input).context("parsing request")?;
    let report = analyze(&params).context("running estimate")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
