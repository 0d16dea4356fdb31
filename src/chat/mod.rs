//! Chatbot core: static Q&A dataset, sentence-embedding index and the
//! answer-matching algorithm.
//!
//! Everything here is built once at startup and read-only afterwards; the
//! handlers only call [`ChatIndex::answer`].

pub mod dataset;
pub mod embedding;
pub mod encoder;
pub mod matcher;

pub use dataset::{load_dataset, QaRecord};
pub use embedding::{Embedding, SentenceEncoder};
pub use encoder::MiniLmEncoder;
pub use matcher::{ChatIndex, MatchOutcome};

use thiserror::Error;

/// Errors from the chat subsystem.
///
/// All of these are fatal for the chatbot only: the service starts without a
/// chat index and answers every question with the fallback text.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Dataset file missing, unreadable or malformed
    #[error("Failed to load dataset: {0}")]
    Dataset(String),

    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file download error
    #[error("Failed to download model: {0}")]
    Download(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query could not be encoded
    #[error("Encoding error: {0}")]
    Encode(String),
}
