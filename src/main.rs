use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pulseq_spiral::spiral::{build, AdcSizing, LoopOrder, SpiralConfig};
use pulseq_spiral::verify::verify_file;

/// Writes a 2D multi-shot variable density spiral sequence as a Pulseq file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML protocol, missing values keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the output file of the protocol
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    adc_sizing: Option<AdcSizing>,
    #[arg(long, value_enum)]
    loop_order: Option<LoopOrder>,
    /// Read the written file back and print a summary
    #[arg(long)]
    verify: bool,
}

fn run(args: Args) -> pulseq_spiral::Result<()> {
    let mut config = match &args.config {
        Some(path) => SpiralConfig::load(path)?,
        None => SpiralConfig::default(),
    };
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(adc_sizing) = args.adc_sizing {
        config.adc_sizing = adc_sizing;
    }
    if let Some(loop_order) = args.loop_order {
        config.loop_order = loop_order;
    }
    log::debug!("{config:?}");

    let (_, seq) = build(&config)?;
    seq.write(&config.output)?;

    if args.verify {
        let summary = verify_file(&config.output)?;
        println!(
            "{}: {} blocks, {:.3} s, {} readouts",
            config.output.display(),
            summary.blocks,
            summary.duration,
            summary.adc_samples.len()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
