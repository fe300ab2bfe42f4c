use thiserror::Error;

/// Everything that can go wrong during one synthesis run. All variants
/// are deterministic functions of the input parameters; none is worth
/// retrying.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The internal integration rate does not divide evenly into output
    /// samples. Raised before any simulation work or RNG draw.
    #[error("internal sampling rate must be an integer multiple of the ECG sampling rate (sfecg = {sfecg} Hz, sfint = {sfint} Hz)")]
    IncompatibleRates { sfecg: u32, sfint: u32 },

    /// The RR spectrum needs an even bin count of at least 4 so the
    /// half-spectrum phase randomization is well defined.
    #[error("RR spectral synthesis requires an even length of at least 4 bins, got {0}")]
    DegenerateSpectrum(usize),

    /// The requested parameters imply an integration grid too short to
    /// integrate over.
    #[error("integration grid has {0} points, need at least 2")]
    GridTooShort(usize),

    /// The adaptive solver diverged or exhausted its step budget.
    #[error("ODE solver failed to converge near t = {t:.3} s")]
    SolverFailed { t: f64 },

    /// A flat trajectory leaves the min-max rescale with a zero range.
    #[error("trajectory has zero amplitude range, cannot rescale to the output interval")]
    FlatTrajectory,
}
