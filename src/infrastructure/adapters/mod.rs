//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod embedding;
pub mod semantic;
pub mod sink;
pub mod structural;
pub mod tokenizer;

pub use embedding::*;
pub use semantic::*;
pub use sink::*;
pub use structural::*;
pub use tokenizer::*;
