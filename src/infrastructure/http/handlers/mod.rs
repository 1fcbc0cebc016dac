//! HTTP Handlers

mod chunk;
mod ping;

pub use chunk::*;
pub use ping::*;
