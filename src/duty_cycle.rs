//! Duty-cycle parsing.
//!
//! A duty-cycle file is a Modelica-style table: two header lines followed by
//! whitespace-delimited `time power` rows. The pipeline only needs the summary
//! (start, end and peak power).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Number of header lines preceding the samples.
const HEADER_LINES: usize = 2;

/// Errors raised while reading a duty-cycle file.
#[derive(Debug, Error)]
pub enum DutyCycleError {
    #[error("cannot read duty cycle \"{}\": {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("duty cycle line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// One `(time, power)` sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub power: f64,
}

/// Parsed duty-cycle time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DutyCycle {
    pub samples: Vec<Sample>,
}

/// Values the batch pipeline consumes from a duty cycle.
///
/// All fields are `None` when the file held no samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DutyCycleSummary {
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Peak power, already scaled to kW.
    pub max_power: Option<f64>,
}

impl DutyCycle {
    /// Reads and parses a duty-cycle file.
    ///
    /// # Errors
    ///
    /// Returns a `DutyCycleError` if the file cannot be read or a sample row is malformed.
    pub fn from_path(path: &Path) -> Result<Self, DutyCycleError> {
        let text = fs::read_to_string(path).map_err(|source| DutyCycleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cycle = Self::parse(&text)?;
        info!(path = %path.display(), samples = cycle.samples.len(), "duty cycle loaded");
        Ok(cycle)
    }

    /// Parses duty-cycle text. Blank lines after the header are ignored.
    ///
    /// Time must never decrease, so the first and last samples bound the
    /// simulation window.
    ///
    /// # Errors
    ///
    /// Returns `DutyCycleError::Parse` naming the 1-based line of the first
    /// row that does not hold two finite numbers or whose time precedes the
    /// row before it.
    pub fn parse(text: &str) -> Result<Self, DutyCycleError> {
        let mut samples = Vec::new();
        for (idx, line) in text.lines().enumerate().skip(HEADER_LINES) {
            let mut cols = line.split_whitespace();
            let Some(first) = cols.next() else {
                continue;
            };
            let line_no = idx + 1;
            let time = parse_field(first, line_no, "time")?;
            let power = match cols.next() {
                Some(p) => parse_field(p, line_no, "power")?,
                None => {
                    return Err(DutyCycleError::Parse {
                        line: line_no,
                        message: "missing power column".to_string(),
                    });
                }
            };
            if let Some(prev) = samples.last().map(|s: &Sample| s.time) {
                if time < prev {
                    return Err(DutyCycleError::Parse {
                        line: line_no,
                        message: format!("time {time} goes back before {prev}"),
                    });
                }
            }
            samples.push(Sample { time, power });
        }
        Ok(Self { samples })
    }

    /// Summarises the series, multiplying power by `power_scale` to reach kW.
    pub fn summary(&self, power_scale: f64) -> DutyCycleSummary {
        DutyCycleSummary {
            start_time: self.samples.first().map(|s| s.time),
            end_time: self.samples.last().map(|s| s.time),
            max_power: self
                .samples
                .iter()
                .map(|s| s.power * power_scale)
                .reduce(f64::max),
        }
    }
}

fn parse_field(value: &str, line: usize, what: &str) -> Result<f64, DutyCycleError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DutyCycleError::Parse {
            line,
            message: format!("{what} \"{value}\" is not a finite number"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "#1\ndouble dutyCycle(4,2)\n0 120.5\n10\t640\n\n20 310\n30 0\n";

    #[test]
    fn parses_samples_after_header() {
        let cycle = DutyCycle::parse(TABLE).expect("should parse");
        assert_eq!(cycle.samples.len(), 4);
        assert_eq!(cycle.samples[1], Sample { time: 10.0, power: 640.0 });
    }

    #[test]
    fn summary_reports_bounds_and_peak() {
        let cycle = DutyCycle::parse(TABLE).expect("should parse");
        let s = cycle.summary(1.0);
        assert_eq!(s.start_time, Some(0.0));
        assert_eq!(s.end_time, Some(30.0));
        assert_eq!(s.max_power, Some(640.0));
        assert_eq!(cycle.summary(0.5).max_power, Some(320.0));
    }

    #[test]
    fn header_only_yields_no_peak() {
        let cycle = DutyCycle::parse("#1\ndouble dutyCycle(0,2)\n").expect("should parse");
        assert_eq!(cycle.summary(1.0), DutyCycleSummary::default());
    }

    #[test]
    fn malformed_row_names_line() {
        let err = DutyCycle::parse("#1\nhdr\n0 1\n5 abc\n").expect_err("must fail");
        assert!(err.to_string().contains("line 4"), "{err}");

        let err = DutyCycle::parse("#1\nhdr\n7\n").expect_err("must fail");
        assert!(err.to_string().contains("missing power"), "{err}");
    }

    #[test]
    fn time_running_backwards_names_line() {
        let err = DutyCycle::parse("#1\nhdr\n0 10\n3600 50\n1200 600\n")
            .expect_err("must fail");
        assert!(err.to_string().contains("line 5"), "{err}");

        let held =
            DutyCycle::parse("#1\nhdr\n0 10\n0 20\n60 5\n").expect("repeated time is allowed");
        let s = held.summary(1.0);
        assert_eq!((s.start_time, s.end_time), (Some(0.0), Some(60.0)));
    }
}
