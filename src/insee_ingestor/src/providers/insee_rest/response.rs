//! Typed model of the BDM JSON body.
//!
//! ```json
//! { "series": [ { "idBank": "001688406",
//!                 "values": [ {"date": "2024-01", "value": 117.9},
//!                             ["2023-12", "117.5"] ] } ] }
//! ```
//!
//! Observations come either as objects or as `[date, value, ...]` arrays.
//! `observations` is accepted in place of `values`; `time`/`TIME_PERIOD`
//! stand in for `date` and `OBS_VALUE` for `value`, the first non-empty one
//! winning. Numeric dates are kept as their decimal text. A missing `series`
//! list, a series without `idBank` or an observation without a date fails the
//! whole parse.

use std::fmt;

use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};
use serde_json::Value;

use crate::models::{Observation, SeriesQuery, SeriesTable};

/// Value markers the API uses for "no observation".
const MISSING_MARKERS: &[&str] = &["", "nan", "nd", "na", "-"];

const DATE_KEYS: &[&str] = &["date", "time", "TIME_PERIOD"];
const VALUE_KEYS: &[&str] = &["value", "OBS_VALUE"];

#[derive(Deserialize, Debug)]
pub struct BdmResponse {
    pub series: Vec<BdmSeries>,
}

#[derive(Deserialize, Debug)]
pub struct BdmSeries {
    #[serde(rename = "idBank", alias = "idbank", alias = "IDBANK")]
    pub idbank: String,
    #[serde(default, alias = "observations")]
    pub values: Vec<BdmObservation>,
}

/// One observation, from either an object or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct BdmObservation {
    pub date: String,
    pub value: ObsValue,
}

impl<'de> Deserialize<'de> for BdmObservation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (date, value) = match Value::deserialize(deserializer)? {
            Value::Object(mut map) => {
                let date = first_present(DATE_KEYS.iter().filter_map(|k| map.remove(*k)));
                let value = first_present(VALUE_KEYS.iter().filter_map(|k| map.remove(*k)));
                (date, value)
            }
            Value::Array(items) if items.len() >= 2 => {
                let mut items = items.into_iter();
                (items.next(), items.next())
            }
            Value::Array(items) => {
                return Err(de::Error::invalid_length(
                    items.len(),
                    &"an array of at least [date, value]",
                ));
            }
            other => {
                return Err(de::Error::invalid_type(
                    unexpected(&other),
                    &"an observation object or array",
                ));
            }
        };

        let date = match date {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(de::Error::missing_field("date")),
        };
        let value = match value {
            Some(v) => ObsValue::deserialize(v).map_err(de::Error::custom)?,
            None => ObsValue::default(),
        };
        Ok(BdmObservation { date, value })
    }
}

/// First value that is neither `null` nor an empty string.
fn first_present(mut candidates: impl Iterator<Item = Value>) -> Option<Value> {
    candidates.find(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

/// A numeric observation value that may be absent.
///
/// Accepts JSON numbers, numeric strings, `null` and the missing-value markers.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ObsValue(pub Option<f64>);

impl<'de> Deserialize<'de> for ObsValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObsValueVisitor;

        impl<'de> Visitor<'de> for ObsValueVisitor {
            type Value = ObsValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, a numeric string or null")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ObsValue, E> {
                Ok(ObsValue(Some(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ObsValue, E> {
                Ok(ObsValue(Some(v as f64)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ObsValue, E> {
                Ok(ObsValue(Some(v as f64)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ObsValue, E> {
                let trimmed = v.trim();
                if MISSING_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
                    return Ok(ObsValue(None));
                }
                trimmed
                    .parse::<f64>()
                    .map(|n| ObsValue(Some(n)))
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_unit<E: de::Error>(self) -> Result<ObsValue, E> {
                Ok(ObsValue(None))
            }

            fn visit_none<E: de::Error>(self) -> Result<ObsValue, E> {
                Ok(ObsValue(None))
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<ObsValue, D::Error> {
                d.deserialize_any(ObsValueVisitor)
            }
        }

        deserializer.deserialize_any(ObsValueVisitor)
    }
}

impl BdmResponse {
    /// Parses a raw body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Flattens every series into table rows for `query`, keeping upstream order.
    pub fn into_table(self, query: &SeriesQuery) -> SeriesTable {
        let rows = self
            .series
            .into_iter()
            .flat_map(|s| {
                let idbank = s.idbank;
                s.values.into_iter().map(move |obs| Observation {
                    idbank: idbank.clone(),
                    date: obs.date,
                    value: obs.value.0,
                })
            })
            .collect();
        SeriesTable::for_query(rows, query)
    }
}
