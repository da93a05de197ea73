//! Errors surfaced by the rewrite pipeline.

use std::io;

use thiserror::Error;

use super::ReduceError;

/// Failure while completing an intercepted response.
///
/// A missing style block or body is not an error: the response is sent
/// unchanged.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("CSS reduction failed")]
    Reduce(#[from] ReduceError),

    #[error("no <style amp-custom> element to splice into")]
    MissingStyle,

    #[error("failed to complete response")]
    Sink(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_reduce_error_keeps_source() {
        let err = PurgeError::from(ReduceError::Parse("unexpected token".into()));
        assert_eq!(err.to_string(), "CSS reduction failed");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("failed to parse CSS: unexpected token"));
    }
}
