//! Trade normalizer — raw storage rows in, validated `Trade`s out.
//!
//! Only missing identity data is an error (symbol, direction, or both
//! timestamps). Everything else is coerced to a documented default so partial
//! broker exports still analyze:
//!
//! | field | default |
//! |---|---|
//! | entry/exit price | 0.0 |
//! | quantity | 1.0 (also for non-positive input) |
//! | pnl, rr, risk_amount | null |
//!
//! Tags come from the primary `tags` map first, then from `extra` for names
//! the primary map does not define.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{Direction, RawTradeRecord, TagMap, TagValue, Trade, TradeId};
use crate::error::{RecordError, ValidationError};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Epoch values above this are taken to be milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Result of lenient batch normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub trades: Vec<Trade>,
    pub rejected: Vec<RecordError>,
}

/// Normalize a batch, failing on the first invalid record.
pub fn normalize(records: &[RawTradeRecord]) -> Result<Vec<Trade>, RecordError> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            normalize_record(raw).map_err(|source| RecordError { index, source })
        })
        .collect()
}

/// Normalize a batch, keeping valid records and collecting rejections.
pub fn normalize_lenient(records: &[RawTradeRecord]) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    for (index, raw) in records.iter().enumerate() {
        match normalize_record(raw) {
            Ok(trade) => outcome.trades.push(trade),
            Err(source) => {
                warn!(index, field = source.field(), error = %source, "rejected trade record");
                outcome.rejected.push(RecordError { index, source });
            }
        }
    }
    outcome
}

/// Normalize a single record.
pub fn normalize_record(raw: &RawTradeRecord) -> Result<Trade, ValidationError> {
    let symbol = non_empty(raw.symbol.as_deref())
        .ok_or(ValidationError::MissingSymbol)?
        .to_uppercase();

    let direction_raw = non_empty(raw.direction.as_deref()).ok_or(ValidationError::MissingDirection)?;
    let direction = Direction::parse(direction_raw)
        .ok_or_else(|| ValidationError::InvalidDirection(direction_raw.to_string()))?;

    let date = timestamp_field(raw.date.as_ref(), "date");
    let created_at = timestamp_field(raw.created_at.as_ref(), "created_at");
    let date = date.or(created_at).ok_or(ValidationError::MissingTimestamp)?;

    Ok(Trade {
        id: raw.id.as_ref().and_then(id_from_json),
        symbol,
        direction,
        entry_price: coerce_f64(raw.entry_price.as_ref()).unwrap_or(0.0),
        exit_price: coerce_f64(raw.exit_price.as_ref()).unwrap_or(0.0),
        quantity: coerce_f64(raw.quantity.as_ref())
            .filter(|q| *q > 0.0)
            .unwrap_or(1.0),
        pnl: coerce_f64(raw.pnl.as_ref()),
        rr: coerce_f64(raw.rr.as_ref()),
        risk_amount: coerce_f64(raw.risk_amount.as_ref()),
        date,
        created_at,
        strategy: non_empty(raw.strategy.as_deref()).map(str::to_string),
        notes: non_empty(raw.notes.as_deref()).map(str::to_string),
        tags: extract_tags(raw.tags.as_ref(), raw.extra.as_ref()),
    })
}

/// Coerce a loosely typed numeric field. Absent, empty, unparseable and
/// non-finite values all yield `None`.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse a timestamp given as a string (RFC 3339, common date-time layouts,
/// or a bare date at midnight) or as a Unix epoch in seconds or milliseconds.
///
/// Offsets are dropped after parsing: the wall-clock time as written is kept.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            let (secs, nanos) = if raw.abs() >= EPOCH_MILLIS_THRESHOLD {
                (raw.div_euclid(1000), (raw.rem_euclid(1000) * 1_000_000) as u32)
            } else {
                (raw, 0)
            };
            DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn timestamp_field(value: Option<&Value>, field: &'static str) -> Option<NaiveDateTime> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let parsed = parse_timestamp(value);
    if parsed.is_none() {
        warn!(field, value = %value, "unparseable timestamp treated as absent");
    }
    parsed
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn id_from_json(value: &Value) -> Option<TradeId> {
    match value {
        Value::String(s) => non_empty(Some(s)).map(TradeId::new),
        Value::Number(n) => Some(TradeId::new(n.to_string())),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tag_value_from_json(value: &Value) -> Option<TagValue> {
    match value {
        Value::Array(items) => TagValue::multi(items.iter().filter_map(scalar_to_string)),
        other => scalar_to_string(other).and_then(|s| TagValue::single(&s)),
    }
}

/// Build the tag map from the primary and fallback sources.
///
/// `TagMap::insert` keeps the first value per name and drops reserved names,
/// so scanning primary before fallback gives primary precedence.
pub fn extract_tags(primary: Option<&Map<String, Value>>, fallback: Option<&Map<String, Value>>) -> TagMap {
    let mut tags = TagMap::new();
    for source in [primary, fallback].into_iter().flatten() {
        for (name, value) in source {
            if let Some(v) = tag_value_from_json(value) {
                tags.insert(name, v);
            }
        }
    }
    tags
}
