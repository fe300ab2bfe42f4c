use clap::Parser;
use std::path::PathBuf;

use crate::{EcgParameters, Morphology};

/// Generate a synthetic ECG waveform from the ECGSYN dynamical model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Output CSV file path
    #[arg(help = "Output CSV file path")]
    pub csv_output: PathBuf,

    /// ECG output sampling rate in Hz
    #[arg(long, default_value = "256")]
    pub sfecg: u32,

    /// Internal integration rate in Hz (must be an integer multiple of sfecg)
    #[arg(long, default_value = "512")]
    pub sfint: u32,

    /// Approximate number of heart beats to synthesize
    #[arg(long, default_value = "256")]
    pub beats: u32,

    /// Mean heart rate in beats per minute
    #[arg(long, default_value = "60.0")]
    pub hrmean: f64,

    /// Heart rate standard deviation in beats per minute
    #[arg(long, default_value = "1.0")]
    pub hrstd: f64,

    /// Low- to high-frequency spectral power ratio of the RR process
    #[arg(long, default_value = "0.5")]
    pub lfhfratio: f64,

    /// Additive uniform measurement noise amplitude in mV
    #[arg(long, default_value = "0.0")]
    pub noise: f64,

    /// RNG seed for reproducible output (entropy-seeded when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON file with a custom morphology ({"ti": [..], "ai": [..], "bi": [..]})
    #[arg(long)]
    pub morphology: Option<PathBuf>,
}

impl Args {
    pub fn to_parameters(&self, morphology: Morphology) -> EcgParameters {
        EcgParameters {
            sfecg: self.sfecg,
            sfint: self.sfint,
            n_beats: self.beats,
            hrmean: self.hrmean,
            hrstd: self.hrstd,
            lfhfratio: self.lfhfratio,
            anoise: self.noise,
            morphology,
        }
    }
}
