//! Character-level n-gram next-character prediction.
//!
//! This crate provides:
//! - A backoff n-gram model over orders `1..=max_grams`
//! - Add-one smoothed ranking and top-k candidate selection
//! - Unigram fallback when every order runs dry
//! - Binary persistence of the learned state
//! - Helpers to turn conversation records into training text
//!
//! ```
//! use ngpred_core::model::{ModelConfig, NGramModel};
//!
//! let mut model = NGramModel::new(ModelConfig::new(3, 10, 3)?);
//! model.train("hello ");
//! assert_eq!(model.predict_next_chars("hel", 1), "l");
//! # Ok::<(), ngpred_core::error::ModelError>(())
//! ```

/// N-gram model, its configuration and persistence.
pub mod model;

/// Text normalization shared by training and prediction.
pub mod normalize;

/// Extraction of training text from conversation records.
pub mod corpus;

/// Error type for training, persistence and configuration.
pub mod error;

/// I/O utilities (line files, prediction output, model path).
pub mod io;

pub use error::{ModelError, Result};
pub use model::{ModelConfig, NGramModel};
pub use normalize::{BasicNormalizer, IdentityNormalizer, Normalizer};
