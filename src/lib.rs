//! Synthetic ECG generation based on the ECGSYN dynamical model
//! (McSharry & Clifford): a rotating limit-cycle oscillator whose
//! angular position fires five Gaussian kicks shaping the P-QRS-T
//! complex, driven by a spectrally synthesized RR-interval process.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod output;
pub mod resample;
pub mod rr_process;
pub mod solver;
pub mod synthesis;

use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// The five-Gaussian P-QRS-T morphology template.
///
/// `ti` holds the event phase angles in degrees around the limit cycle,
/// `ai` the signed kick amplitudes and `bi` the Gaussian widths. The
/// defaults encode the canonical P, Q, R, S and T waves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Morphology {
    pub ti: [f64; 5],
    pub ai: [f64; 5],
    pub bi: [f64; 5],
}

impl Default for Morphology {
    fn default() -> Self {
        Self {
            ti: [-70.0, -15.0, 0.0, 15.0, 100.0],
            ai: [1.2, -5.0, 30.0, -7.5, 0.75],
            bi: [0.25, 0.1, 0.1, 0.1, 0.4],
        }
    }
}

impl Morphology {
    /// Convert the template to radians and stretch it for the mean heart
    /// rate. Faster rates compress the waveform asymmetrically: widths
    /// scale with `sqrt(hr/60)`, the outer P/T angles with its square
    /// root, the R angle not at all.
    pub fn rate_adjusted(&self, hrmean: f64) -> ([f64; 5], [f64; 5], [f64; 5]) {
        let hrfact = (hrmean / 60.0).sqrt();
        let hrfact2 = hrfact.sqrt();
        let stretch = [hrfact2, hrfact, 1.0, hrfact, hrfact2];

        let mut ti = [0.0; 5];
        let mut bi = [0.0; 5];
        for k in 0..5 {
            ti[k] = self.ti[k].to_radians() * stretch[k];
            bi[k] = self.bi[k] * hrfact;
        }
        (ti, self.ai, bi)
    }
}

/// Full parameter set for one synthesis run.
#[derive(Debug, Clone)]
pub struct EcgParameters {
    /// Output ECG sampling rate in Hz.
    pub sfecg: u32,
    /// Internal integration sampling rate in Hz; must be an integer
    /// multiple of `sfecg`.
    pub sfint: u32,
    /// Approximate number of heart beats to synthesize. The RR process
    /// rounds this up to a power of two.
    pub n_beats: u32,
    /// Mean heart rate in beats per minute.
    pub hrmean: f64,
    /// Heart rate standard deviation in beats per minute.
    pub hrstd: f64,
    /// Ratio of low-frequency (Mayer wave) to high-frequency
    /// (respiratory) spectral power in the RR process.
    pub lfhfratio: f64,
    /// Amplitude of additive uniform measurement noise, in the output
    /// mV-like units.
    pub anoise: f64,
    /// Beat morphology template.
    pub morphology: Morphology,
}

impl Default for EcgParameters {
    fn default() -> Self {
        Self {
            sfecg: 256,
            sfint: 512,
            n_beats: 256,
            hrmean: 60.0,
            hrstd: 1.0,
            lfhfratio: 0.5,
            anoise: 0.0,
            morphology: Morphology::default(),
        }
    }
}

impl EcgParameters {
    /// Check the sampling-rate invariant before any simulation work.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.sfecg == 0 || self.sfint == 0 || self.sfint % self.sfecg != 0 {
            return Err(SynthError::IncompatibleRates {
                sfecg: self.sfecg,
                sfint: self.sfint,
            });
        }
        Ok(())
    }

    /// Stride between internal-rate samples kept in the output.
    pub fn downsample_factor(&self) -> usize {
        (self.sfint / self.sfecg) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_morphology_is_canonical() {
        let m = Morphology::default();
        assert_eq!(m.ti, [-70.0, -15.0, 0.0, 15.0, 100.0]);
        assert_eq!(m.ai[2], 30.0); // R wave dominates
    }

    #[test]
    fn rate_adjustment_is_identity_at_60_bpm() {
        let m = Morphology::default();
        let (ti, ai, bi) = m.rate_adjusted(60.0);
        for k in 0..5 {
            assert!((ti[k] - m.ti[k].to_radians()).abs() < 1e-12);
            assert_eq!(ai[k], m.ai[k]);
            assert!((bi[k] - m.bi[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn rate_adjustment_compresses_widths_at_higher_rates() {
        let m = Morphology::default();
        let (ti, _, bi) = m.rate_adjusted(120.0);
        let hrfact = (120.0f64 / 60.0).sqrt();
        assert!((bi[0] - m.bi[0] * hrfact).abs() < 1e-12);
        // the R angle is pinned at zero
        assert_eq!(ti[2], 0.0);
    }

    #[test]
    fn validate_accepts_integer_rate_ratio() {
        assert!(EcgParameters::default().validate().is_ok());
        let params = EcgParameters {
            sfecg: 128,
            sfint: 512,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.downsample_factor(), 4);
    }

    #[test]
    fn validate_rejects_non_integer_rate_ratio() {
        let params = EcgParameters {
            sfecg: 256,
            sfint: 500,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("256") && msg.contains("500"));
    }

    #[test]
    fn morphology_loads_from_json() {
        let json = r#"{"ti": [-60, -10, 0, 10, 90],
                       "ai": [1.0, -4.0, 25.0, -6.0, 0.5],
                       "bi": [0.2, 0.1, 0.1, 0.1, 0.3]}"#;
        let m: Morphology = serde_json::from_str(json).unwrap();
        assert_eq!(m.ti[4], 90.0);
        assert_eq!(m.bi[0], 0.2);
    }
}
