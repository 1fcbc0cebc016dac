//! Sink Adapter - 分块输出实现

mod file_sink;

pub use file_sink::FileChunkSink;
