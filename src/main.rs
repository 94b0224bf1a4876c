use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use locata_loader::{LoadError, load_locata_data};

#[derive(Parser, Debug)]
#[clap(name = "locata-loader")]
#[clap(about = "Load a LOCATA recording folder and print a summary")]
struct Args {
    /// Recording folder (holds required_time.txt, *.wav and *.txt files)
    dir: PathBuf,

    /// Evaluation mode: source audio and positions are withheld
    #[clap(long)]
    eval: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = match load_locata_data(&args.dir, !args.eval) {
        Ok(ds) => ds,
        Err(err @ LoadError::UnexpectedAudio { .. }) => {
            log::error!("{err}");
            std::process::exit(1);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("loading {}", args.dir.display()));
        }
    };

    let summary = serde_json::to_string_pretty(&dataset.summary()).context("serializing summary")?;
    println!("{summary}");
    Ok(())
}
