//! Vocabulary module - the words the agent has learned.
//!
//! - **Word**: a normalized string, the messages it occurs in, and its author
//! - **Vocabulary**: the index of all known words, persisted as JSON
//! - **VocabularyLearner**: log observer that grows the vocabulary

mod index;
mod learner;
mod word;

pub use index::*;
pub use learner::*;
pub use word::*;
