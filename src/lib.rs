//! Extraction of markup-embedded tool calls from model output, for complete
//! responses and for token-by-token streams.
pub mod core;
pub mod server;
pub mod tools;
pub mod utils;
