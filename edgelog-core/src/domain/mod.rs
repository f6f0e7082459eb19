//! Domain types for edgelog

pub mod ids;
pub mod raw;
pub mod tags;
pub mod trade;

pub use ids::{DatasetHash, TradeId};
pub use raw::RawTradeRecord;
pub use tags::{
    canonical_tag_name, is_reserved_tag_name, TagMap, TagPair, TagValue, RESERVED_TAG_NAMES,
    RESERVED_TAG_PREFIXES,
};
pub use trade::{chronological, Direction, Outcome, Trade};

/// Symbol type alias
pub type Symbol = String;
