//! 应用层 - 命令
//!
//! 分块相关的全部操作

mod chunk_commands;

pub mod handlers;

pub use chunk_commands::*;
