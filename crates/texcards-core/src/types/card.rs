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

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::sm2;
use crate::types::aliases::CardId;
use crate::types::aliases::SectionName;
use crate::types::date::Date;
use crate::types::record::RepetitionRecord;

/// Section of cards that appear before any `\section{}` marker.
pub const DEFAULT_SECTION: &str = "General";

/// A single question/answer card parsed from a document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Card {
    id: CardId,
    question: String,
    answer: String,
    section: SectionName,
    source: PathBuf,
    /// 1-based line of the card's begin marker.
    line: usize,
    schedule: RepetitionRecord,
}

impl Card {
    pub fn new(
        id: CardId,
        question: String,
        answer: String,
        section: SectionName,
        source: PathBuf,
        line: usize,
        schedule: RepetitionRecord,
    ) -> Self {
        Self {
            id,
            question,
            answer,
            section,
            source,
            line,
            schedule,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn schedule(&self) -> &RepetitionRecord {
        &self.schedule
    }

    pub(crate) fn set_schedule(&mut self, schedule: RepetitionRecord) {
        self.schedule = schedule;
    }

    pub fn is_due(&self, today: Date) -> bool {
        sm2::is_due(&self.schedule, today)
    }

    pub fn next_review_date(&self) -> Option<Date> {
        sm2::next_review_date(&self.schedule)
    }
}
