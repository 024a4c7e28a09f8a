//! Retrieval module - the indexes the reply engine searches.
//!
//! - **SimilarityIndex**: messages that look like a given text
//! - **AssociationTable**: free association between words
//! - **ResponseLinker**: which later message answered a given message

mod association;
mod linker;
mod similarity;

pub use association::*;
pub use linker::*;
pub use similarity::*;
