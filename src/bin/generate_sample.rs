use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use locata_loader::data::sample::{SampleOptions, write_sample_dataset};

#[derive(Parser, Debug)]
#[clap(name = "generate_sample")]
#[clap(about = "Write a synthetic LOCATA recording folder")]
struct Args {
    /// Output folder
    #[clap(default_value = "sample_locata")]
    output: PathBuf,

    /// Leave out source audio and positions
    #[clap(long)]
    eval: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let opts = SampleOptions {
        eval: args.eval,
        ..Default::default()
    };
    let output = args.output;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    write_sample_dataset(&output, &opts).context("writing sample dataset")?;

    println!(
        "Wrote {} arrays and {} sources ({} frames @ {} Hz) to {}",
        opts.arrays.len(),
        if opts.eval { 0 } else { opts.sources.len() },
        opts.frames,
        opts.sample_rate,
        output.display()
    );
    Ok(())
}
