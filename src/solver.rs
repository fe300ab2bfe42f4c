use log::trace;

use crate::error::SynthError;

/// State vector of the ECG system.
pub type State = [f64; 3];

const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const SAFETY: f64 = 0.9;
// error is controlled by the embedded 4th-order solution
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Tolerances and budget for the adaptive integrator. Defaults match
/// the usual RK45 settings (rtol 1e-3, atol 1e-6).
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    pub rtol: f64,
    pub atol: f64,
    /// Internal steps allowed between two consecutive output points
    /// before the solve is declared non-convergent.
    pub max_steps_per_interval: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps_per_interval: 10_000,
        }
    }
}

/// Integrate `dx/dt = f(t, x)` from `x0` across the `t_eval` grid with
/// an embedded Dormand-Prince 5(4) pair.
///
/// Step sizes adapt to the local error estimate but are clipped so the
/// solver lands exactly on every evaluation point; the returned
/// trajectory has one state per grid point regardless of the internal
/// step sequence. `t_eval` must be strictly increasing.
pub fn integrate<F>(
    f: F,
    x0: State,
    t_eval: &[f64],
    opts: &SolverOptions,
) -> Result<Vec<State>, SynthError>
where
    F: Fn(f64, &State) -> State,
{
    if t_eval.len() < 2 {
        return Err(SynthError::GridTooShort(t_eval.len()));
    }

    let mut out = Vec::with_capacity(t_eval.len());
    out.push(x0);

    let mut t = t_eval[0];
    let mut x = x0;
    let mut h = t_eval[1] - t_eval[0];

    for window in t_eval.windows(2) {
        let target = window[1];
        let mut steps = 0usize;

        while t < target {
            steps += 1;
            if steps > opts.max_steps_per_interval || !h.is_finite() || h <= 0.0 {
                return Err(SynthError::SolverFailed { t });
            }

            let clipped = h >= target - t;
            let h_try = if clipped { target - t } else { h };

            let (x_new, err) = dormand_prince_step(&f, t, &x, h_try);
            let norm = error_norm(&x, &x_new, &err, opts);

            if !norm.is_finite() {
                return Err(SynthError::SolverFailed { t });
            }

            let factor = if norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * norm.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if norm <= 1.0 {
                t = if clipped { target } else { t + h_try };
                x = x_new;
                h = h_try * factor;
            } else {
                trace!("rejected step at t = {t:.6}, norm = {norm:.3}");
                h = h_try * factor.min(1.0);
                let underflow = f64::EPSILON * t.abs().max(1.0);
                if h < underflow {
                    return Err(SynthError::SolverFailed { t });
                }
            }
        }

        out.push(x);
    }

    Ok(out)
}

/// One explicit Dormand-Prince step: returns the 5th-order solution and
/// the embedded error estimate.
fn dormand_prince_step<F>(f: &F, t: f64, x: &State, h: f64) -> (State, State)
where
    F: Fn(f64, &State) -> State,
{
    let k1 = f(t, x);
    let k2 = f(t + h / 5.0, &stage(x, h, &[(1.0 / 5.0, &k1)]));
    let k3 = f(
        t + 3.0 * h / 10.0,
        &stage(x, h, &[(3.0 / 40.0, &k1), (9.0 / 40.0, &k2)]),
    );
    let k4 = f(
        t + 4.0 * h / 5.0,
        &stage(
            x,
            h,
            &[(44.0 / 45.0, &k1), (-56.0 / 15.0, &k2), (32.0 / 9.0, &k3)],
        ),
    );
    let k5 = f(
        t + 8.0 * h / 9.0,
        &stage(
            x,
            h,
            &[
                (19372.0 / 6561.0, &k1),
                (-25360.0 / 2187.0, &k2),
                (64448.0 / 6561.0, &k3),
                (-212.0 / 729.0, &k4),
            ],
        ),
    );
    let k6 = f(
        t + h,
        &stage(
            x,
            h,
            &[
                (9017.0 / 3168.0, &k1),
                (-355.0 / 33.0, &k2),
                (46732.0 / 5247.0, &k3),
                (49.0 / 176.0, &k4),
                (-5103.0 / 18656.0, &k5),
            ],
        ),
    );

    let x5 = stage(
        x,
        h,
        &[
            (35.0 / 384.0, &k1),
            (500.0 / 1113.0, &k3),
            (125.0 / 192.0, &k4),
            (-2187.0 / 6784.0, &k5),
            (11.0 / 84.0, &k6),
        ],
    );
    let k7 = f(t + h, &x5);

    let mut err = [0.0; 3];
    for i in 0..3 {
        err[i] = h
            * (71.0 / 57600.0 * k1[i] - 71.0 / 16695.0 * k3[i] + 71.0 / 1920.0 * k4[i]
                - 17253.0 / 339200.0 * k5[i]
                + 22.0 / 525.0 * k6[i]
                - 1.0 / 40.0 * k7[i]);
    }

    (x5, err)
}

fn stage(x: &State, h: f64, terms: &[(f64, &State)]) -> State {
    let mut y = *x;
    for i in 0..3 {
        let mut acc = 0.0;
        for (c, k) in terms {
            acc += c * k[i];
        }
        y[i] += h * acc;
    }
    y
}

fn error_norm(x_old: &State, x_new: &State, err: &State, opts: &SolverOptions) -> f64 {
    let mut sum = 0.0;
    for i in 0..3 {
        let scale = opts.atol + opts.rtol * x_old[i].abs().max(x_new[i].abs());
        let e = err[i] / scale;
        sum += e * e;
    }
    (sum / 3.0).sqrt()
}
