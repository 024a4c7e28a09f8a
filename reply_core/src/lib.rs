//! # Reply Core
//!
//! The turn-level brain of the learning chat agent. It watches the
//! conversation, learns from it through `chat_corpus`, and on each turn
//! decides whether to speak and what to say.
//!
//! ## Core Components
//!
//! - **attention**: Talkativeness modes and the response probability model
//! - **engine**: Ingestion, retrieval, word-substitution generation, and commands
//! - **settings**: File-backed settings and the compiled engine configuration
//! - **client**: The transport the engine speaks through
//! - **thought**: Trace records of how each reply was chosen
//!
//! ## Design Philosophy
//!
//! - **Turn-Based**: Each event is processed to completion before the next
//! - **Bounded**: Every search has a fixed upper bound on work
//! - **Replayable**: All randomness comes from one seedable source

pub mod attention;
pub mod client;
pub mod engine;
pub mod error;
pub mod settings;
pub mod thought;

pub use attention::*;
pub use client::*;
pub use engine::*;
pub use error::*;
pub use settings::*;
pub use thought::*;
