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

//! SM-2 scheduling.
//!
//! Intervals grow geometrically by the ease factor after the first two
//! successful reviews (1 day, then 6 days). A failed review resets the
//! streak and the interval. The ease factor moves after every review,
//! successful or not, and never drops below [`MIN_EASE`].
//!
//! Interval products are rounded half away from zero (`f64::round`), which
//! for the positive values involved here is round-half-up.

use crate::types::date::Date;
use crate::types::quality::Quality;
use crate::types::record::MIN_EASE;
use crate::types::record::RepetitionRecord;

/// Interval after the first successful review.
const FIRST_INTERVAL: u32 = 1;

/// Interval after the second consecutive successful review.
const SECOND_INTERVAL: u32 = 6;

/// Compute the record that results from reviewing a card on `today` with
/// the given recall quality.
pub fn update(record: &RepetitionRecord, quality: Quality, today: Date) -> RepetitionRecord {
    let (interval, repetition_streak) = if quality.is_success() {
        let streak = record.repetition_streak.saturating_add(1);
        let interval = match streak {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => grow(record.interval, record.ease_factor),
        };
        (interval, streak)
    } else {
        (FIRST_INTERVAL, 0)
    };
    RepetitionRecord {
        last_review: Some(today),
        interval,
        ease_factor: new_ease(record.ease_factor, quality),
        repetition_streak,
    }
}

/// A card is due if it was never reviewed, or if its interval has elapsed.
pub fn is_due(record: &RepetitionRecord, today: Date) -> bool {
    match next_review_date(record) {
        Some(next) => today >= next,
        None => true,
    }
}

pub fn next_review_date(record: &RepetitionRecord) -> Option<Date> {
    record
        .last_review
        .map(|last| last.add_days(record.interval))
}

fn grow(interval: u32, ease: f64) -> u32 {
    // `as` saturates, so absurd products pin to u32::MAX instead of wrapping.
    let product = (f64::from(interval) * ease).round() as u32;
    product.max(FIRST_INTERVAL)
}

fn new_ease(ease: f64, quality: Quality) -> f64 {
    let miss = f64::from(5 - quality.value());
    (ease + 0.1 - miss * (0.08 + miss * 0.02)).max(MIN_EASE)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::Fallible;
    use crate::types::record::DEFAULT_EASE;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_first_review_good() {
        let today = ymd(2024, 1, 1);
        let result = update(&RepetitionRecord::default(), q(4), today);
        assert_eq!(result.last_review, Some(today));
        assert_eq!(result.repetition_streak, 1);
        assert_eq!(result.interval, 1);
        assert!(approx_eq(result.ease_factor, 2.5));
    }

    #[test]
    fn test_first_review_perfect() {
        let result = update(&RepetitionRecord::default(), q(5), ymd(2024, 1, 1));
        assert_eq!(result.repetition_streak, 1);
        assert_eq!(result.interval, 1);
        assert!(approx_eq(result.ease_factor, 2.6));
    }

    #[test]
    fn test_second_success_is_six_days() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 1, 1)),
            interval: 1,
            ease_factor: DEFAULT_EASE,
            repetition_streak: 1,
        };
        let result = update(&record, q(4), ymd(2024, 1, 2));
        assert_eq!(result.repetition_streak, 2);
        assert_eq!(result.interval, 6);
    }

    #[test]
    fn test_later_successes_use_previous_ease() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 1, 2)),
            interval: 6,
            ease_factor: 2.6,
            repetition_streak: 2,
        };
        // Quality 3 lowers the ease, but the interval uses the old value.
        let result = update(&record, q(3), ymd(2024, 1, 8));
        assert_eq!(result.repetition_streak, 3);
        assert_eq!(result.interval, 16);
        assert!(approx_eq(result.ease_factor, 2.6 - 0.14));
    }

    #[test]
    fn test_interval_rounds_half_up() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 1, 1)),
            interval: 5,
            ease_factor: 2.5,
            repetition_streak: 2,
        };
        let result = update(&record, q(5), ymd(2024, 1, 6));
        assert_eq!(result.interval, 13);
    }

    #[test]
    fn test_failure_resets() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 1, 1)),
            interval: 40,
            ease_factor: 2.5,
            repetition_streak: 5,
        };
        let result = update(&record, q(0), ymd(2024, 2, 10));
        assert_eq!(result.repetition_streak, 0);
        assert_eq!(result.interval, 1);
        assert!(approx_eq(result.ease_factor, 1.7));
        assert_eq!(result.last_review, Some(ymd(2024, 2, 10)));
    }

    #[test]
    fn test_ease_is_floored() {
        let mut record = RepetitionRecord::default();
        for day in 1..=10 {
            record = update(&record, q(0), ymd(2024, 1, day));
            assert!(record.ease_factor >= MIN_EASE);
        }
        assert!(approx_eq(record.ease_factor, MIN_EASE));
        assert!(record.interval >= 1);
    }

    #[test]
    fn test_ease_deltas_by_quality() -> Fallible<()> {
        let expected = [-0.8, -0.54, -0.32, -0.14, 0.0, 0.1];
        for (value, delta) in expected.iter().enumerate() {
            let quality = Quality::new(value as u8)?;
            let result = update(&RepetitionRecord::default(), quality, ymd(2024, 1, 1));
            assert!(approx_eq(result.ease_factor, DEFAULT_EASE + delta));
        }
        Ok(())
    }

    #[test]
    fn test_never_reviewed_is_due() {
        let record = RepetitionRecord::default();
        assert!(is_due(&record, ymd(1970, 1, 1)));
        assert_eq!(next_review_date(&record), None);
    }

    #[test]
    fn test_due_on_and_after_next_review() {
        let record = RepetitionRecord {
            last_review: Some(ymd(2024, 1, 1)),
            interval: 6,
            ease_factor: 2.5,
            repetition_streak: 2,
        };
        assert_eq!(next_review_date(&record), Some(ymd(2024, 1, 7)));
        assert!(!is_due(&record, ymd(2024, 1, 6)));
        assert!(is_due(&record, ymd(2024, 1, 7)));
        assert!(is_due(&record, ymd(2024, 3, 1)));
    }
}
