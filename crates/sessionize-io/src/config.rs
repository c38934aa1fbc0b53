use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read an inactivity window from a one-number text file (seconds,
/// possibly fractional).
pub fn read_window_file(path: &Path) -> Result<i64> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inactivity window file {}", path.display()))?;
    let value: f64 = contents.trim().parse().with_context(|| {
        format!(
            "inactivity window file {} does not contain a number",
            path.display()
        )
    })?;
    validate_window(value)
        .with_context(|| format!("invalid inactivity window in {}", path.display()))
}

/// Validate a window given in seconds and round it up to whole seconds
/// (timestamps carry no sub-second resolution).
pub fn validate_window(secs: f64) -> Result<i64> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("inactivity window must be a positive number of seconds, got {secs}");
    }
    Ok(secs.ceil() as i64)
}
