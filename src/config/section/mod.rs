//! Configuration section definitions.
//!
//! Each section in `amp-purge.toml`:
//!
//! | Type                  | TOML Section | Purpose                          |
//! |-----------------------|--------------|----------------------------------|
//! | `purge::PurgeOptions` | `[purge]`    | Minify, whitelist, debug report  |
//! | `ServeConfig`         | `[serve]`    | Development server               |

mod serve;

pub use serve::ServeConfig;
