//! # Chat Corpus
//!
//! The learned memory of the reply engine. This crate holds everything the
//! engine knows about past conversation and does not make any speaking
//! decisions itself.
//!
//! ## Core Components
//!
//! - **vocabulary**: Known words, the messages they occur in, and who taught them
//! - **log**: Append-only conversation log with ordered observers
//! - **tokenizer**: Discovery of new words in raw utterances
//! - **retrieval**: Similarity index, word associations, and response linking

pub mod error;
pub mod log;
pub mod retrieval;
pub mod tokenizer;
pub mod vocabulary;

pub use error::*;
pub use log::*;
pub use retrieval::*;
pub use tokenizer::*;
pub use vocabulary::*;
