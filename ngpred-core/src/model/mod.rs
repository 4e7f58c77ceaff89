//! Backoff character n-gram model.
//!
//! - Model configuration (`ModelConfig`)
//! - Per-order frequency tables (`FrequencyTable`, `Distribution`)
//! - Training, backoff prediction and batch prediction (`NGramModel`)
//! - Binary persistence of the learned state

/// Construction parameters: highest order, fallback size, `top_k` bound.
pub mod config;

/// Context -> next-character counts for one n-gram order,
/// and the smoothed ranking of a single distribution.
pub mod frequency_table;

/// The model: training, backoff prediction, batch prediction.
pub mod ngram_model;

/// `save` / `load` of the learned state (postcard blob in a work dir).
mod persistence;

pub use config::ModelConfig;
pub use frequency_table::{Distribution, FrequencyTable};
pub use ngram_model::{ModelSummary, NGramModel};
