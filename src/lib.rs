//! docgrep - semantic search over local plaintext files.
//!
//! The pipeline: select files, load them into documents, embed each
//! document with a local ONNX model (consulting a content-addressed cache
//! first), then rank documents against the embedded query by cosine
//! similarity.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod indexer;
pub mod loader;
pub mod model;
pub mod search;
pub mod select;

pub use error::{Error, Result};
