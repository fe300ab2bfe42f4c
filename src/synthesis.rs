use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dynamics::{self, EcgDynamics};
use crate::error::SynthError;
use crate::resample;
use crate::rr_process::{self, SpectralBands};
use crate::solver::{self, SolverOptions};
use crate::EcgParameters;

/// Sampling rate of the raw RR process, Hz.
const SFRR: f64 = 1.0;

/// Fixed initial state on the limit cycle.
const X0: [f64; 3] = [1.0, 0.0, 0.04];

/// Output amplitude range, mV-like units.
const Z_MIN: f64 = -0.4;
const Z_MAX: f64 = 1.2;

/// Synthesize one ECG waveform at `params.sfecg` Hz.
///
/// Pure apart from the RNG draws: the same parameters and RNG state
/// produce an identical signal, and independent RNGs make concurrent
/// calls safe. The returned samples span the whole synthesized beat
/// train and lie in `[-0.4 - anoise, 1.2 + anoise]`.
pub fn simulate<R: Rng + ?Sized>(
    params: &EcgParameters,
    rng: &mut R,
) -> Result<Vec<f64>, SynthError> {
    params.validate()?;
    let q = params.downsample_factor();
    let dt = 1.0 / params.sfint as f64;

    // Beat-to-beat interval process, then lift it from 1 Hz to the
    // internal rate and mark the beat boundaries.
    let rrmean = 60.0 / params.hrmean;
    let n = beat_count(params.n_beats, rrmean);
    debug!("synthesizing {} beats ({} requested)", n, params.n_beats);

    let rr0 = rr_process::rr_process(
        &SpectralBands::default(),
        params.lfhfratio,
        params.hrmean,
        params.hrstd,
        SFRR,
        n,
        rng,
    )?;
    let rr = resample::resample_fft(&rr0, n * params.sfint as usize);
    let (timeline, nt) = dynamics::build_rate_timeline(&rr, dt);
    if nt < 2 {
        return Err(SynthError::GridTooShort(nt));
    }

    // Integrate the oscillator across the whole record at the internal
    // rate, with the rate timeline setting the angular velocity.
    let (ti, ai, bi) = params.morphology.rate_adjusted(params.hrmean);
    let system = EcgDynamics::new(timeline, ti, ai, bi, params.sfint as f64);
    let t_eval: Vec<f64> = (0..nt).map(|i| i as f64 * dt).collect();
    let trajectory = solver::integrate(
        |t, x| system.derivative(t, x),
        X0,
        &t_eval,
        &SolverOptions::default(),
    )?;

    // Drop to the output rate, rescale the ECG coordinate to the fixed
    // amplitude window and add measurement noise.
    let z: Vec<f64> = trajectory.iter().step_by(q).map(|state| state[2]).collect();
    let zmin = z.iter().cloned().fold(f64::INFINITY, f64::min);
    let zmax = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let zrange = zmax - zmin;
    if !(zrange.is_finite() && zrange > 0.0) {
        return Err(SynthError::FlatTrajectory);
    }

    let gain = (Z_MAX - Z_MIN) / zrange;
    let signal: Vec<f64> = z
        .iter()
        .map(|&v| {
            let scaled = (v - zmin) * gain + Z_MIN;
            scaled + params.anoise * (2.0 * rng.gen::<f64>() - 1.0)
        })
        .collect();

    info!(
        "generated {} samples at {} Hz ({:.1} s of ECG)",
        signal.len(),
        params.sfecg,
        signal.len() as f64 / params.sfecg as f64
    );
    Ok(signal)
}

/// Convenience wrapper seeding a `StdRng` for reproducible output.
pub fn simulate_seeded(params: &EcgParameters, seed: u64) -> Result<Vec<f64>, SynthError> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate(params, &mut rng)
}

/// Number of beats actually synthesized: the requested count, rounded
/// up so the record covers it with a power-of-two RR sequence at the
/// RR sampling rate.
fn beat_count(requested: u32, rrmean: f64) -> usize {
    let samples = (requested as f64 * rrmean * SFRR).max(1.0);
    let exponent = samples.log2().ceil().max(0.0) as u32;
    1usize << exponent
}
