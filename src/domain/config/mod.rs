//! Configuration domain module

mod app_config;
mod backends;

pub use app_config::{
    AppConfig, ServerConfig, DEFAULT_IDENTITY, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_SERVER_URL,
};
pub use backends::{PdfReaderKind, StoreKind};
