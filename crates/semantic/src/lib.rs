//! Sentence embeddings for the resume analyzer.
//!
//! Text goes in, a unit-length `Vec<f32>` comes out. The expensive part is the model, and the
//! model is not reentrant, so everything here revolves around one rule: a single worker thread
//! owns it and serves embedding requests one at a time, in the order they arrive.
//!
//! Two modes:
//!
//! - **ONNX mode** - run a sentence-transformer (all-MiniLM-L6-v2 by default) locally with
//!   mean pooling over token states. Needs `model.onnx` and `tokenizer.json`; both can be
//!   downloaded on first use when URLs are configured.
//! - **Fast mode** - deterministic hashed bag-of-words vectors. No model files, good for tests
//!   and local runs.
//!
//! ## Lifecycle
//!
//! Creating an [`EmbeddingQueue`] only starts the worker thread. The model is loaded when the
//! first embedding is requested; concurrent first callers simply queue behind that load. If
//! loading fails, the failure sticks: every later call gets the same [`SemanticError::ModelLoad`].
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{EmbeddingQueue, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = EmbeddingQueue::from_config(&SemanticConfig::fast()).unwrap();
//!     let vector = queue.embed("Senior Rust engineer").await.unwrap();
//!     assert_eq!(vector.len(), 384);
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod assets;
mod normalize;
mod onnx;
mod queue;
mod stub;

pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::queue::EmbeddingQueue;
pub use crate::types::{EmbeddingModel, ModelStatus};
