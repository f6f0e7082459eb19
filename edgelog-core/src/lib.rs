//! edgelog core — trade domain model, normalizer, analysis window, fingerprinting.
//!
//! Everything downstream of this crate works on validated [`domain::Trade`]
//! values. Raw storage rows enter through [`normalize`], which is the only
//! place input can be rejected.

pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod window;

pub use domain::{Direction, Outcome, RawTradeRecord, TagMap, TagPair, TagValue, Trade, TradeId};
pub use error::{RecordError, ValidationError};
pub use fingerprint::dataset_hash;
pub use normalize::{normalize, normalize_lenient, normalize_record, NormalizeOutcome};
pub use window::TradeWindow;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: domain types can cross threads.
    ///
    /// The report builder fans components out with rayon, so every type handed
    /// to a component must be Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Trade>();
        require_sync::<Trade>();
        require_send::<TagMap>();
        require_sync::<TagMap>();
        require_send::<TagPair>();
        require_sync::<TagPair>();
        require_send::<RawTradeRecord>();
        require_sync::<RawTradeRecord>();
        require_send::<TradeWindow>();
        require_sync::<TradeWindow>();
        require_send::<domain::DatasetHash>();
        require_sync::<domain::DatasetHash>();
        require_send::<ValidationError>();
        require_sync::<ValidationError>();
        require_send::<RecordError>();
        require_sync::<RecordError>();
    }
}
