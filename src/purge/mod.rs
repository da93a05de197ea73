//! Unused-CSS purging for `<style amp-custom>`.
//!
//! # Module Structure
//!
//! ```text
//! purge/
//! ├── payload     # Payload, ResponseBuffer (chunk accumulation)
//! ├── document    # Locate/extract/splice on the raw HTML
//! ├── reducer     # CssReducer trait + lightningcss implementation
//! ├── options     # PurgeOptions ([purge] section)
//! ├── report      # Outcome + debug report lines
//! ├── sink        # ResponseSink trait, MemorySink, WriterSink
//! ├── rewrite     # Orchestrator (decide → reduce → splice → complete)
//! ├── intercept   # ResponseInterceptor (the wrapping shim)
//! └── error       # PurgeError
//! ```
//!
//! # Flow
//!
//! ```text
//! write(chunk) ─▶ ResponseBuffer
//! finish(chunk) ─▶ ResponseBuffer ─▶ Orchestrator::decide
//!                                      ├─ PassThrough ─▶ sink.finish(original)
//!                                      └─ Rewrite ─▶ CssReducer ─▶ splice
//!                                                    └─▶ content-length ─▶ sink.finish(purified)
//! ```

mod document;
mod error;
mod intercept;
mod options;
mod payload;
mod reducer;
mod report;
mod rewrite;
mod sink;

pub use document::{AMP_CUSTOM, StyleBlock, extract_body, extract_style, locate_style, splice_style};
pub use error::PurgeError;
pub use intercept::ResponseInterceptor;
pub use options::PurgeOptions;
pub use payload::{Payload, ResponseBuffer};
pub use reducer::{CssReducer, LightningReducer, ReduceError, ReduceOptions};
pub use report::{Outcome, Report};
pub use rewrite::{CONTENT_LENGTH, Decision, Orchestrator};
pub use sink::{MemorySink, ResponseSink, WriterSink};
