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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// The lowest quality that still counts as a successful recall.
const PASSING: u8 = 3;

/// How well a card was recalled, on the SM-2 scale:
///
/// - 0: complete blackout.
/// - 1: wrong, but the answer was recognised.
/// - 2: wrong, but the answer seemed easy to recall.
/// - 3: correct with serious difficulty.
/// - 4: correct after some hesitation.
/// - 5: perfect response.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(5);

    pub fn new(value: u8) -> Fallible<Self> {
        if value > Self::MAX.0 {
            return fail(format!("quality must be between 0 and 5, got {value}"));
        }
        Ok(Self(value))
    }

    /// Maps a five-button rating (1 = forgot ... 5 = perfect) onto the SM-2
    /// scale. Both failing buttons drop by one, so "forgot" is a blackout.
    pub fn from_rating(rating: u8) -> Fallible<Self> {
        match rating {
            1 | 2 => Ok(Self(rating - 1)),
            3..=5 => Ok(Self(rating)),
            _ => fail(format!("rating must be between 1 and 5, got {rating}")),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= PASSING
    }
}

impl TryFrom<u8> for Quality {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
