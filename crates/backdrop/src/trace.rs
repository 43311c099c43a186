//! Recorded pointer traces: one `x,y` pair per line, `#` starts a comment.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: expected `x,y`, got {text:?}")]
pub struct TraceError {
    pub line: usize,
    pub text: String,
}

pub fn parse_trace(input: &str) -> Result<Vec<(f64, f64)>, TraceError> {
    let mut samples = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let parsed = line.split_once(',').and_then(|(x, y)| {
            Some((x.trim().parse::<f64>().ok()?, y.trim().parse::<f64>().ok()?))
        });
        match parsed {
            Some(sample) => samples.push(sample),
            None => return Err(TraceError { line: i + 1, text: raw.to_string() }),
        }
    }
    Ok(samples)
}

/// A diagonal sweep across the viewport, used when no trace is supplied.
pub fn sweep(width: u32, height: u32, steps: usize) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            (t * width as f64, t * height as f64)
        })
        .collect()
}
