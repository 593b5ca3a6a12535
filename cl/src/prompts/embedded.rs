//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Refine a raw seed idea
pub const INITIATE: &str = include_str!("../../prompts/initiate.pmt");

/// Extend the current idea by one chain step
pub const ORCHESTRATE: &str = include_str!("../../prompts/orchestrate.pmt");

/// Merge a list of ideas into one suggestion
pub const SYNTHESIZE: &str = include_str!("../../prompts/synthesize.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        super::INITIATE => Some(INITIATE),
        super::ORCHESTRATE => Some(ORCHESTRATE),
        super::SYNTHESIZE => Some(SYNTHESIZE),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
