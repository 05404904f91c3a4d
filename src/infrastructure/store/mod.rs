//! Topic repository adapters

mod file;
mod http;
mod memory;

pub use file::FileTopicRepository;
pub use http::HttpTopicRepository;
pub use memory::MemoryTopicRepository;
