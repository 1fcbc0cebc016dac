//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod enforcer;
mod pipeline_handlers;

pub use enforcer::*;
pub use pipeline_handlers::*;
