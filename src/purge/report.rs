//! Per-response outcome and the one-line debug report.

use std::fmt;

/// What happened to one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The style block was reduced and spliced back in.
    Purified {
        original_bytes: usize,
        purified_bytes: usize,
    },
    /// No `<style amp-custom>` in `<head>`; sent unchanged.
    NoMarker,
    /// No `<body>`; sent unchanged.
    NoBody,
}

impl Outcome {
    pub fn is_purified(&self) -> bool {
        matches!(self, Self::Purified { .. })
    }

    /// The report line for this outcome, if it has one.
    ///
    /// A missing body is silent.
    pub fn report(&self) -> Option<Report> {
        match *self {
            Self::Purified {
                original_bytes,
                purified_bytes,
            } => Some(Report::Reduced {
                original_bytes,
                purified_bytes,
            }),
            Self::NoMarker => Some(Report::NoMarker),
            Self::NoBody => None,
        }
    }
}

/// Debug report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Reduced {
        original_bytes: usize,
        purified_bytes: usize,
    },
    NoMarker,
}

impl Report {
    /// Bytes removed; negative when pretty-printing grew the CSS.
    pub fn removed(&self) -> i64 {
        match *self {
            Self::Reduced {
                original_bytes,
                purified_bytes,
            } => original_bytes as i64 - purified_bytes as i64,
            Self::NoMarker => 0,
        }
    }

    /// Share of the original CSS removed, in percent. `0.0` for empty CSS.
    pub fn percentage(&self) -> f64 {
        match *self {
            Self::Reduced { original_bytes, .. } if original_bytes > 0 => {
                self.removed() as f64 / original_bytes as f64 * 100.0
            }
            _ => 0.0,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reduced { .. } => write!(
                f,
                "Purge AMP CSS removed {} bytes of unused CSS ({:.2}%)",
                self.removed(),
                self.percentage()
            ),
            Self::NoMarker => f.write_str("Purge AMP CSS found no <style amp-custom> element"),
        }
    }
}

/// Print a report line through the logger.
pub fn emit(report: &Report) {
    crate::log!("purge"; "{report}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_line() {
        let report = Report::Reduced {
            original_bytes: 5,
            purified_bytes: 0,
        };
        assert_eq!(
            report.to_string(),
            "Purge AMP CSS removed 5 bytes of unused CSS (100.00%)"
        );
    }

    #[test]
    fn test_partial_reduction() {
        let report = Report::Reduced {
            original_bytes: 3,
            purified_bytes: 2,
        };
        assert_eq!(report.removed(), 1);
        assert_eq!(
            report.to_string(),
            "Purge AMP CSS removed 1 bytes of unused CSS (33.33%)"
        );
    }

    #[test]
    fn test_empty_css() {
        let report = Report::Reduced {
            original_bytes: 0,
            purified_bytes: 0,
        };
        assert_eq!(
            report.to_string(),
            "Purge AMP CSS removed 0 bytes of unused CSS (0.00%)"
        );
    }

    #[test]
    fn test_no_marker_line() {
        assert_eq!(
            Report::NoMarker.to_string(),
            "Purge AMP CSS found no <style amp-custom> element"
        );
    }

    #[test]
    fn test_outcome_report() {
        assert_eq!(Outcome::NoBody.report(), None);
        assert_eq!(Outcome::NoMarker.report(), Some(Report::NoMarker));
        let outcome = Outcome::Purified {
            original_bytes: 10,
            purified_bytes: 4,
        };
        assert!(outcome.is_purified());
        assert_eq!(outcome.report().map(|r| r.removed()), Some(6));
    }
}
