use anyhow::Result;
use std::path::Path;

/// Write the generated waveform as a two-column CSV (time in seconds,
/// amplitude in the mV-like output units).
pub fn write_signal_csv(path: &Path, signal: &[f64], sfecg: u32) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    println!("Writing waveform to {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["time_s", "amplitude_mv"])?;
    let dt = 1.0 / sfecg as f64;
    for (i, value) in signal.iter().enumerate() {
        writer.write_record([format!("{:.6}", i as f64 * dt), format!("{value:.6}")])?;
    }
    writer.flush()?;
    Ok(())
}
