mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use cli::Cli;
use kquant::color::to_hex;
use rayon::prelude::*;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = cli.config();
    config.validate()?;

    // Each file is an independent computation, so they can share the pool.
    let outcomes: Vec<_> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let output = cli.output_for(input);
            info!("Processing {} -> {}", input.display(), output.display());
            let palette = kquant::process_file(input, &output, &config, cli.seed);
            (input, palette)
        })
        .collect();

    let mut failures = 0;
    for (input, outcome) in outcomes {
        match outcome {
            Ok(palette) => {
                if cli.print_palette {
                    let hex: Vec<String> = palette.iter().map(to_hex).collect();
                    println!("{}: {}", input.display(), hex.join(","));
                }
            }
            Err(e) => {
                error!("{}: {:#}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} images failed", failures, cli.inputs.len());
    }
    info!("Done!");
    Ok(())
}
