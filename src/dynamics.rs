use log::debug;
use std::f64::consts::TAU;

/// Respiratory frequency driving the slow baseline drift of the ECG
/// coordinate, in Hz.
const FRESP: f64 = 0.25;

/// Amplitude of the respiratory baseline in the z coordinate.
const ZBASE_AMPLITUDE: f64 = 0.005;

/// Wrap a phase difference into `(-pi, pi]`.
///
/// Round-based rather than a plain remainder: a remainder leaves a 2*pi
/// discontinuity at the +-pi boundary, and the Gaussian kicks are
/// sharply sensitive to the wrapped distance there.
pub fn wrap_phase(d: f64) -> f64 {
    d - (d / TAU).round() * TAU
}

/// Turn the upsampled RR series (seconds per beat, one value per
/// internal-rate sample) into a piecewise-constant timeline where each
/// sample carries the RR interval of the beat containing it.
///
/// Walks beat boundaries by accumulating elapsed time and rounding to
/// the nearest sample index. Returns the timeline together with the
/// final boundary index `nt`, which is the total integration length
/// (and may land one boundary past the timeline's end; rate lookups
/// clamp).
pub fn build_rate_timeline(rr: &[f64], dt: f64) -> (Vec<f64>, usize) {
    let mut timeline = vec![0.0; rr.len()];
    let mut elapsed = 0.0;
    let mut i = 0usize;
    let mut nt = 0usize;
    while i < rr.len() {
        elapsed += rr[i];
        let mut ip = (elapsed / dt).round() as usize;
        if ip <= i {
            // degenerate (non-positive or sub-sample) interval; force
            // the walk forward so it terminates
            ip = i + 1;
        }
        let end = ip.min(rr.len());
        for slot in &mut timeline[i..end] {
            *slot = rr[i];
        }
        nt = ip;
        i = ip;
    }
    debug!("rate timeline: {} samples, nt = {}", rr.len(), nt);
    (timeline, nt)
}

/// Immutable context evaluated by the integrator: the rate timeline,
/// the rate-adjusted morphology and the internal sampling rate. One
/// instance is built per synthesis call; nothing here mutates.
pub struct EcgDynamics {
    rr: Vec<f64>,
    ti: [f64; 5],
    ai: [f64; 5],
    bi: [f64; 5],
    sfint: f64,
}

impl EcgDynamics {
    pub fn new(rr_timeline: Vec<f64>, ti: [f64; 5], ai: [f64; 5], bi: [f64; 5], sfint: f64) -> Self {
        debug_assert!(!rr_timeline.is_empty());
        Self {
            rr: rr_timeline,
            ti,
            ai,
            bi,
            sfint,
        }
    }

    /// Right-hand side of the 3-state ECGSYN system.
    ///
    /// `(x0, x1)` rotate on a unit limit cycle at the angular velocity
    /// set by the current RR interval; the phase angle selects five
    /// Gaussian kicks that pull `x2` through the P-QRS-T shape, on top
    /// of a slow respiratory baseline.
    pub fn derivative(&self, t: f64, x: &[f64; 3]) -> [f64; 3] {
        let a0 = 1.0 - (x[0] * x[0] + x[1] * x[1]).sqrt();

        let ip = ((t * self.sfint).floor() as usize).min(self.rr.len() - 1);
        let w0 = TAU / self.rr[ip];

        let zbase = ZBASE_AMPLITUDE * (TAU * FRESP * t).sin();

        let theta = x[1].atan2(x[0]);
        let mut kicks = 0.0;
        for k in 0..5 {
            let dtheta = wrap_phase(theta - self.ti[k]);
            kicks -= self.ai[k] * dtheta * (-0.5 * (dtheta / self.bi[k]).powi(2)).exp();
        }

        [
            a0 * x[0] - w0 * x[1],
            a0 * x[1] + w0 * x[0],
            kicks - (x[2] - zbase),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn wrap_stays_small_near_the_boundary() {
        // theta = 3.13 against an event at -3.13: the raw difference is
        // 6.26, the wrapped distance must be tiny
        let d = wrap_phase(3.13 - (-3.13));
        assert!(d.abs() < 0.1, "wrapped to {d}");
        assert!(d > -PI && d <= PI);
    }

    #[test]
    fn wrap_covers_the_half_open_interval() {
        for i in -100..=100 {
            let d = wrap_phase(i as f64 * 0.37);
            assert!(d > -PI - 1e-12 && d <= PI + 1e-12, "{d} out of range");
        }
        assert_eq!(wrap_phase(0.0), 0.0);
        assert!((wrap_phase(TAU) - 0.0).abs() < 1e-12);
        assert!((wrap_phase(PI + 0.001) + PI - 0.001).abs() < 1e-9);
    }

    #[test]
    fn timeline_is_piecewise_constant_at_beat_boundaries() {
        // ten samples of 0.5 s beats at dt = 0.1: boundaries at indices
        // 5 and 10
        let rr = vec![0.5; 10];
        let (timeline, nt) = build_rate_timeline(&rr, 0.1);
        assert_eq!(nt, 10);
        assert_eq!(timeline, vec![0.5; 10]);

        // a slower second beat shifts the final boundary out
        let rr = vec![0.5, 0.5, 0.5, 0.5, 0.5, 0.8, 0.8, 0.8, 0.8, 0.8];
        let (timeline, nt) = build_rate_timeline(&rr, 0.1);
        assert_eq!(&timeline[..5], &[0.5; 5]);
        assert_eq!(&timeline[5..], &[0.8; 5]);
        assert_eq!(nt, 13); // 0.5 + 0.8 s elapsed at the second boundary
    }

    #[test]
    fn timeline_walk_terminates_on_degenerate_intervals() {
        let (timeline, nt) = build_rate_timeline(&[0.0, 0.0, 0.0], 0.1);
        assert_eq!(timeline.len(), 3);
        assert!(nt >= 3);
    }

    #[test]
    fn derivative_rotates_on_the_limit_cycle() {
        let dynamics = EcgDynamics::new(vec![1.0; 100], [0.0; 5], [0.0; 5], [0.1; 5], 10.0);
        // on the unit circle the radial term vanishes and the angular
        // velocity is 2*pi / rr
        let dx = dynamics.derivative(0.0, &[1.0, 0.0, 0.0]);
        assert!(dx[0].abs() < 1e-12);
        assert!((dx[1] - TAU).abs() < 1e-12);
    }

    #[test]
    fn derivative_restores_toward_the_limit_cycle() {
        let dynamics = EcgDynamics::new(vec![1.0; 100], [0.0; 5], [0.0; 5], [0.1; 5], 10.0);
        // outside the circle the radial component points inward
        let dx = dynamics.derivative(0.0, &[2.0, 0.0, 0.0]);
        assert!(dx[0] < 0.0);
        // inside, outward
        let dx = dynamics.derivative(0.0, &[0.5, 0.0, 0.0]);
        assert!(dx[0] > 0.0);
    }

    #[test]
    fn rate_lookup_clamps_past_the_timeline_end() {
        let dynamics = EcgDynamics::new(vec![1.0, 2.0], [0.0; 5], [0.0; 5], [0.1; 5], 1.0);
        let dx = dynamics.derivative(50.0, &[1.0, 0.0, 0.0]);
        assert!((dx[1] - TAU / 2.0).abs() < 1e-12);
    }

    #[test]
    fn z_coordinate_decays_toward_the_respiratory_baseline() {
        let dynamics = EcgDynamics::new(vec![1.0; 100], [0.0; 5], [0.0; 5], [0.1; 5], 10.0);
        // with zero kick amplitudes dz/dt = -(z - zbase)
        let dx = dynamics.derivative(1.0, &[1.0, 0.0, 0.5]);
        let zbase = 0.005 * (TAU * 0.25f64).sin();
        assert!((dx[2] + (0.5 - zbase)).abs() < 1e-12);
    }
}
