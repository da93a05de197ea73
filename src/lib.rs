//! amp-purge - strip unused CSS from `<style amp-custom>` before a response
//! leaves the server.
//!
//! The core is [`purge::ResponseInterceptor`]: wrap any
//! [`purge::ResponseSink`], write the document through it, and the sink
//! receives the same document with unused rules removed and an updated
//! `Content-Length`.
//!
//! ```ignore
//! use amp_purge::purge::{MemorySink, PurgeOptions, ResponseInterceptor};
//!
//! let mut sink = MemorySink::new();
//! let mut response = ResponseInterceptor::new(&mut sink, PurgeOptions::default());
//! response.write(head, ());
//! response.finish(rest, ())?;
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod logger;
pub mod purge;
pub mod utils;
