//! Core types, configuration and abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod quote;

// Re-export main types for cleaner imports
pub use error::{CotacaoError, StoreError, UpstreamError};
pub use quote::{Quote, QuoteSource, QuoteStore, StoredQuote};
