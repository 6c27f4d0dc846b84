//! `scan_predict`: next-word suggestions for the scanning keyboard.
//!
//! Pipeline (mirrors a classic input-method engine):
//! - analysis: raw text -> context words + partial prefix
//! - translator: n-gram continuations, frequent-word completions
//! - filter: dedup / rank / pad / truncate
//! - remote (optional): external word predictor, bounded by a timeout, never required
//!
//! `PredictionWorker` runs the engine off the interaction thread and only
//! delivers the newest request's result.
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod remote;
pub mod translator;
pub mod worker;

pub use analysis::Analysis;
pub use config::{PredictConfig, RemoteConfig};
pub use engine::PredictionEngine;
pub use error::{PredictError, Result};
pub use model::{Candidate, Source};
pub use remote::{HttpSuggestionSource, RemoteQuery, SuggestionSource};
pub use worker::{PredictionWorker, RequestId, Suggestions};
