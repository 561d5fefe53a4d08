//! Timestamps, dates and times of day
//!
//! All three travel as epoch milliseconds written as a string. `timestamp`
//! and `time` add a `Nanos` member holding the nanosecond of the second, so
//! sub-millisecond precision survives.

use super::{NANOS, Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::value::Value;
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use serde_json::{Map, Value as Json};
use time::{OffsetDateTime, Time};

const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct TemporalStrategy;

impl Strategy for TemporalStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let (millis, nanos) = match value {
            Value::Timestamp(t) => {
                let millis = t.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI);
                (millis.to_string(), Some(t.nanosecond()))
            }
            Value::Date(d) => {
                let millis = d.midnight().assume_utc().unix_timestamp() * 1000;
                (millis.to_string(), None)
            }
            Value::Time(t) => {
                let (h, m, s, nanos) = t.as_hms_nano();
                let seconds = i64::from(h) * 3600 + i64::from(m) * 60 + i64::from(s);
                let millis = seconds * 1000 + i64::from(nanos) / 1_000_000;
                (millis.to_string(), Some(nanos))
            }
            other => return Err(mismatch(site, other, walker)),
        };

        let mut token = typed_token(site.encoded);
        token.insert(VALUE.to_string(), Json::String(millis));
        if let Some(nanos) = nanos {
            token.insert(NANOS.to_string(), Json::from(nanos));
        }
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        let millis = read_millis(member(token, VALUE)?, walker)?;
        let nanos = read_nanos(token, millis, walker)?;
        let out_of_range = |e: time::error::ComponentRange| {
            MarshalError::malformed(format!("{e} at `{}`", walker.path()))
        };

        match site.shape {
            TypeDescriptor::Timestamp => {
                let seconds = i128::from(millis.div_euclid(1000));
                OffsetDateTime::from_unix_timestamp_nanos(
                    seconds * NANOS_PER_SECOND + i128::from(nanos),
                )
                .map(Value::Timestamp)
                .map_err(out_of_range)
            }
            TypeDescriptor::Date => OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000))
                .map(|t| Value::Date(t.date()))
                .map_err(out_of_range),
            TypeDescriptor::Time => {
                let of_day = millis.rem_euclid(MILLIS_PER_DAY) / 1000;
                let (h, m, s) = (of_day / 3600, (of_day / 60) % 60, of_day % 60);
                // Bounded by the day length above
                Time::from_hms_nano(h as u8, m as u8, s as u8, nanos)
                    .map(Value::Time)
                    .map_err(out_of_range)
            }
            other => Err(MarshalError::malformed(format!(
                "`{other}` is not a temporal type"
            ))),
        }
    }
}

fn read_millis(json: &Json, walker: &GraphWalker<'_>) -> MarshalResult<i64> {
    let millis = match json {
        Json::String(s) => s.parse().ok(),
        Json::Number(n) => n.as_i64(),
        _ => None,
    };
    millis.ok_or_else(|| {
        MarshalError::malformed(format!(
            "expected epoch milliseconds at `{}`, got {json}",
            walker.path()
        ))
    })
}

/// Nanosecond of the second; derived from the milliseconds when absent
fn read_nanos(token: &Map<String, Json>, millis: i64, walker: &GraphWalker<'_>) -> MarshalResult<u32> {
    match token.get(NANOS) {
        None | Some(Json::Null) => Ok((millis.rem_euclid(1000) * 1_000_000) as u32),
        Some(json) => json
            .as_u64()
            .filter(|n| i128::from(*n) < NANOS_PER_SECOND)
            .map(|n| n as u32)
            .ok_or_else(|| {
                MarshalError::malformed(format!(
                    "`{NANOS}` must be below one second at `{}`, got {json}",
                    walker.path()
                ))
            }),
    }
}
