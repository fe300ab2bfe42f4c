use rustfft::{num_complex::Complex, FftPlanner};

/// Fourier-domain resampling of a real signal to `num` samples.
///
/// Forward FFT, grow (or cut) the spectrum to the target length, then
/// inverse FFT. On upsampling from an even length the Nyquist bin is
/// split in half between the positive and negative frequencies so the
/// reconstruction stays real; on downsampling the folded bins are
/// summed. Values at the original sample instants are preserved for
/// band-limited input.
pub fn resample_fft(signal: &[f64], num: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || num == 0 {
        return Vec::new();
    }
    if num == n {
        return signal.to_vec();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    fft.process(&mut buffer);

    let m = n.min(num);
    let nyq = m / 2;
    // odd lengths have no Nyquist bin; the top bin is copied like any other
    let upper = if m % 2 == 0 { nyq } else { nyq + 1 };
    let mut shaped = vec![Complex::new(0.0, 0.0); num];
    shaped[0] = buffer[0];
    for k in 1..upper {
        shaped[k] = buffer[k];
        shaped[num - k] = buffer[n - k];
    }
    if m % 2 == 0 {
        if num > n {
            // upsample: split the old Nyquist coefficient
            shaped[nyq] = buffer[nyq] * 0.5;
            shaped[num - nyq] = buffer[nyq] * 0.5;
        } else {
            // downsample: fold the old bins onto the new Nyquist
            shaped[nyq] = buffer[nyq] + buffer[n - nyq];
        }
    }

    let ifft = planner.plan_fft_inverse(num);
    ifft.process(&mut shaped);

    // unnormalized inverse; dividing by the input length folds in the
    // num/n amplitude correction as well
    shaped.iter().map(|c| c.re / n as f64).collect()
}
