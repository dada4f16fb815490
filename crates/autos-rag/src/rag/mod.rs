//! Question answering over a case's persisted documents
//!
//! The model decides which documents it needs: the first call offers one
//! retrieval tool per extractable document family, the orchestrator executes
//! the requested retrievals, and a second call produces the consolidated
//! answer.

pub mod orchestrator;
pub mod tools;

pub use orchestrator::{RagAnswer, RagOrchestrator};
pub use tools::ToolRegistry;
