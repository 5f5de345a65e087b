// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-card scheduling state and its single-line text encoding.
//!
//! A record is stored as four colon-separated fields:
//!
//! ```text
//! <last review date or "none">:<interval days>:<ease, two decimals>:<streak>
//! ```
//!
//! Records written before streaks were tracked only have the first three
//! fields; the streak then defaults to zero.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::date::Date;

/// Lower bound for the ease factor.
pub const MIN_EASE: f64 = 1.3;

/// Ease factor of a card that has never been reviewed.
pub const DEFAULT_EASE: f64 = 2.5;

/// Interval of a card that has never been reviewed.
pub const DEFAULT_INTERVAL: u32 = 1;

/// Date sentinel for a card that has never been reviewed.
const NEVER: &str = "none";

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RepetitionRecord {
    /// When the card was last reviewed. `None` means never.
    pub last_review: Option<Date>,
    /// Days from the last review until the next one. Always at least 1.
    pub interval: u32,
    /// SM-2 ease factor. Never below [`MIN_EASE`].
    pub ease_factor: f64,
    /// Consecutive successful reviews.
    pub repetition_streak: u32,
}

impl Default for RepetitionRecord {
    fn default() -> Self {
        Self {
            last_review: None,
            interval: DEFAULT_INTERVAL,
            ease_factor: DEFAULT_EASE,
            repetition_streak: 0,
        }
    }
}

impl RepetitionRecord {
    pub fn is_new(&self) -> bool {
        self.last_review.is_none()
    }

    /// Encode the record as a metadata payload.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a metadata payload. Anything that can't be decoded yields the
    /// default record, together with the reason it was rejected.
    pub fn decode(payload: &str) -> (Self, Option<ErrorReport>) {
        match payload.parse() {
            Ok(record) => (record, None),
            Err(e) => {
                log::debug!("Ignoring undecodable repetition record {payload:?}: {e}");
                (Self::default(), Some(e))
            }
        }
    }
}

impl Display for RepetitionRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.last_review {
            Some(date) => write!(f, "{date}")?,
            None => write!(f, "{NEVER}")?,
        }
        write!(
            f,
            ":{}:{:.2}:{}",
            self.interval, self.ease_factor, self.repetition_streak
        )
    }
}

impl FromStr for RepetitionRecord {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').map(str::trim).collect();
        if fields.len() < 3 {
            return fail(format!("expected at least 3 fields, found {}", fields.len()));
        }
        let last_review: Option<Date> = match fields[0] {
            NEVER => None,
            date => Some(date.parse()?),
        };
        let interval: u32 = parse_field(fields[1], "interval")?;
        let ease_factor: f64 = parse_field(fields[2], "ease factor")?;
        if !ease_factor.is_finite() {
            return fail(format!("ease factor is not a number: {}", fields[2]));
        }
        let repetition_streak: u32 = match fields.get(3) {
            Some(field) => parse_field(field, "repetition streak")?,
            None => 0,
        };
        Ok(Self {
            last_review,
            interval: interval.max(DEFAULT_INTERVAL),
            ease_factor: ease_factor.max(MIN_EASE),
            repetition_streak,
        })
    }
}

fn parse_field<T: FromStr>(field: &str, name: &str) -> Fallible<T> {
    field
        .parse()
        .map_err(|_| ErrorReport::new(format!("invalid {name}: {field:?}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn decoded(payload: &str) -> RepetitionRecord {
        RepetitionRecord::decode(payload).0
    }

    #[test]
    fn test_encode_default() {
        assert_eq!(RepetitionRecord::default().encode(), "none:1:2.50:0");
    }

    #[test]
    fn test_encode_reviewed() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 3, 9)),
            interval: 15,
            ease_factor: 2.36,
            repetition_streak: 3,
        };
        assert_eq!(record.encode(), "2024-03-09:15:2.36:3");
        assert_eq!(decoded(&record.encode()), record);
    }

    #[test]
    fn test_encode_rounds_ease_to_two_places() {
        let record = RepetitionRecord {
            ease_factor: 2.5 - 0.14,
            ..RepetitionRecord::default()
        };
        assert_eq!(record.encode(), "none:1:2.36:0");
        let decoded = decoded(&record.encode());
        assert!((decoded.ease_factor - record.ease_factor).abs() < 0.005);
    }

    #[test]
    fn test_decode_legacy_three_fields() {
        let record = decoded("2024-01-02:6:2.60");
        assert_eq!(
            record,
            RepetitionRecord {
                last_review: Some(ymd(2024, 1, 2)),
                interval: 6,
                ease_factor: 2.6,
                repetition_streak: 0,
            }
        );
    }

    #[test]
    fn test_decode_never_reviewed() {
        let record = decoded("none:1:2.50:0");
        assert!(record.is_new());
        assert_eq!(record, RepetitionRecord::default());
    }

    #[test]
    fn test_decode_too_few_fields() {
        assert_eq!(decoded("none:1"), RepetitionRecord::default());
        assert_eq!(decoded(""), RepetitionRecord::default());
        assert!("none:1".parse::<RepetitionRecord>().is_err());
    }

    #[test]
    fn test_decode_reports_rejection() {
        let (record, error) = RepetitionRecord::decode("someday:1:2.50:0");
        assert_eq!(record, RepetitionRecord::default());
        assert!(error.is_some());

        let (record, error) = RepetitionRecord::decode("2024-01-02:0:1.10:4");
        assert_eq!(record.interval, 1);
        assert!(error.is_none());
    }

    #[test]
    fn test_decode_garbage_fields() {
        assert_eq!(
            decoded("someday:1:2.50:0"),
            RepetitionRecord::default()
        );
        assert_eq!(
            decoded("none:-3:2.50:0"),
            RepetitionRecord::default()
        );
        assert_eq!(
            decoded("none:1:NaN:0"),
            RepetitionRecord::default()
        );
        assert_eq!(
            decoded("none:1:2.5:many"),
            RepetitionRecord::default()
        );
    }

    #[test]
    fn test_decode_clamps_to_invariants() {
        let record = decoded("2024-01-02:0:1.10:4");
        assert_eq!(record.interval, 1);
        assert_eq!(record.ease_factor, MIN_EASE);
        assert_eq!(record.repetition_streak, 4);
    }

    #[test]
    fn test_decode_tolerates_whitespace_and_extra_fields() {
        let record = decoded(" 2024-01-02 : 6 : 2.60 : 2 :extra\r");
        assert_eq!(record.last_review, Some(ymd(2024, 1, 2)));
        assert_eq!(record.interval, 6);
        assert_eq!(record.repetition_streak, 2);
    }
}
