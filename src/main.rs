use anyhow::Context;
use clap::Parser;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufReader;

use ecg_synth::config::Args;
use ecg_synth::{output, synthesis, Morphology};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let morphology = match &args.morphology {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening morphology preset {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing morphology preset {}", path.display()))?
        }
        None => Morphology::default(),
    };

    let params = args.to_parameters(morphology);
    debug!("parameters: {:?}", params);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "Synthesizing ~{} beats at {} Hz (heart rate {} +/- {} bpm)",
        args.beats, args.sfecg, args.hrmean, args.hrstd
    );
    let signal = synthesis::simulate(&params, &mut rng)?;

    let min = signal.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = signal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "Generated {} samples ({:.1} s), amplitude range [{:.3}, {:.3}]",
        signal.len(),
        signal.len() as f64 / args.sfecg as f64,
        min,
        max
    );

    output::write_signal_csv(&args.csv_output, &signal, params.sfecg)?;

    Ok(())
}
