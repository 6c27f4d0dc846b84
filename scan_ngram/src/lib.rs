//! `scan_ngram`: persisted word / bigram / trigram usage model.
//!
//! - `NgramStore` owns every entry and is the only writer
//! - keys are uppercase; multi-word keys are space-joined
//! - the JSON file is the only persisted state; a missing or corrupt file is an empty model
mod config;
mod entry;
mod error;
mod shared;
mod store;

pub use config::StoreConfig;
pub use entry::NgramEntry;
pub use error::{Result, StoreError};
pub use shared::SharedNgramStore;
pub use store::{NgramKind, NgramStore, tokenize};
