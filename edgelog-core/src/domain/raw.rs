//! RawTradeRecord — a trade row as handed over by the storage collaborator.
//!
//! Every field is optional and loosely typed: numbers may arrive as strings,
//! timestamps in several layouts, tag values as scalars or lists. Both
//! snake_case and camelCase field names are accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, alias = "side", alias = "type")]
    pub direction: Option<String>,

    #[serde(default, alias = "entryPrice")]
    pub entry_price: Option<Value>,
    #[serde(default, alias = "exitPrice")]
    pub exit_price: Option<Value>,
    #[serde(default, alias = "qty")]
    pub quantity: Option<Value>,

    #[serde(default)]
    pub pnl: Option<Value>,
    #[serde(default)]
    pub rr: Option<Value>,
    #[serde(default, alias = "riskAmount")]
    pub risk_amount: Option<Value>,

    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<Value>,

    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    /// Primary tag source.
    #[serde(default, alias = "variables")]
    pub tags: Option<Map<String, Value>>,
    /// Fallback tag source.
    #[serde(default, alias = "extra_data", alias = "extraData")]
    pub extra: Option<Map<String, Value>>,
}
