//! Rewrite orchestration: decide, reduce, splice, complete.
//!
//! ```text
//! Collecting ──finish──▶ Deciding ──┬─ no style / no body ─▶ PassThrough ─┐
//!                                   └─ both present ───────▶ Rewriting ───┴─▶ Completed
//! ```
//!
//! `Collecting` lives in the interceptor; everything after the first
//! `finish` happens here, exactly once per response.

use super::document::{self, StyleBlock};
use super::report::{self, Outcome};
use super::{CssReducer, PurgeError, PurgeOptions, ResponseSink};
use crate::debug;

/// Header recomputed after a rewrite.
pub const CONTENT_LENGTH: &str = "content-length";

/// Result of inspecting a collected document.
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    /// Send the document as collected.
    PassThrough(Outcome),
    /// Reduce the style block using this body fragment.
    Rewrite { style: StyleBlock, body: String },
}

/// Per-response orchestrator.
pub struct Orchestrator<'a, R: ?Sized> {
    options: &'a PurgeOptions,
    reducer: &'a R,
}

impl<'a, R: CssReducer + ?Sized> Orchestrator<'a, R> {
    pub fn new(options: &'a PurgeOptions, reducer: &'a R) -> Self {
        Self { options, reducer }
    }

    /// Style first, then body; either missing means pass through.
    pub fn decide(&self, html: &str) -> Decision {
        let Some(style) = document::locate_style(html) else {
            return Decision::PassThrough(Outcome::NoMarker);
        };
        let Some(body) = document::extract_body(html) else {
            return Decision::PassThrough(Outcome::NoBody);
        };
        Decision::Rewrite { style, body }
    }

    /// Produce the document to send and what happened to it.
    ///
    /// A reducer failure is returned as-is; no partially rewritten document
    /// is ever produced.
    pub fn rewrite(&self, html: String) -> Result<(String, Outcome), PurgeError> {
        match self.decide(&html) {
            Decision::PassThrough(outcome) => {
                self.report(&outcome);
                Ok((html, outcome))
            }
            Decision::Rewrite { style, body } => {
                let css = style.css(&html);
                let purified =
                    self.reducer
                        .reduce(&body, css, &self.options.reduce_options())?;

                let outcome = Outcome::Purified {
                    original_bytes: css.len(),
                    purified_bytes: purified.len(),
                };
                self.report(&outcome);

                Ok((style.splice(&html, &purified), outcome))
            }
        }
    }

    /// Rewrite `html`, fix up `Content-Length`, and finish `sink` once.
    pub fn complete<S: ResponseSink>(
        &self,
        mut sink: S,
        html: String,
        args: S::Args,
    ) -> Result<Outcome, PurgeError> {
        let (html, outcome) = self.rewrite(html)?;

        if outcome.is_purified() {
            if sink.headers_sent() {
                debug!("purge"; "headers already sent, keeping original content-length");
            } else {
                sink.set_header(CONTENT_LENGTH, &html.len().to_string());
            }
        }

        sink.finish(html.into(), args).map_err(PurgeError::Sink)?;
        Ok(outcome)
    }

    fn report(&self, outcome: &Outcome) {
        if !self.options.debug {
            return;
        }
        if let Some(line) = outcome.report() {
            report::emit(&line);
        }
    }
}

#[cfg(test)]
mod tests;
