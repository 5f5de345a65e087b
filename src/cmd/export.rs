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

use std::fs::write;
use std::path::Path;

use serde::Serialize;
use texcards_core::Card;
use texcards_core::Date;
use texcards_core::Deck;
use texcards_core::Fallible;
use texcards_core::RepetitionRecord;

use crate::collection::Collection;

#[derive(Serialize)]
struct ExportedCard<'a> {
    id: &'a str,
    section: &'a str,
    source: &'a Path,
    line: usize,
    question: &'a str,
    answer: &'a str,
    schedule: &'a RepetitionRecord,
    next_review: Option<Date>,
}

impl<'a> From<&'a Card> for ExportedCard<'a> {
    fn from(card: &'a Card) -> Self {
        Self {
            id: card.id(),
            section: card.section(),
            source: card.source(),
            line: card.line(),
            question: card.question(),
            answer: card.answer(),
            schedule: card.schedule(),
            next_review: card.next_review_date(),
        }
    }
}

pub fn export_collection(directory: Option<String>, output: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let json = export_json(&collection.deck)?;
    match output {
        Some(path) => write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn export_json(deck: &Deck) -> Fallible<String> {
    let cards: Vec<ExportedCard> = deck.cards().iter().map(ExportedCard::from).collect();
    Ok(serde_json::to_string_pretty(&cards)?)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use serde_json::Value;

    use super::*;
    use crate::collection::tests::create_test_collection;
    use crate::collection::tests::path_string;

    #[test]
    fn test_export() -> Fallible<()> {
        let dir = create_test_collection()?;
        let output = dir.path().join("export.json");
        export_collection(path_string(&dir), Some(output.display().to_string()))?;

        let value: Value = serde_json::from_str(&read_to_string(&output)?)?;
        let cards = value.as_array().map(Vec::len);
        assert_eq!(cards, Some(3));
        let first = &value[0];
        assert_eq!(first["id"], "quadratic");
        assert_eq!(first["section"], "Algebra");
        assert_eq!(first["line"], 2);
        assert_eq!(first["schedule"]["last_review"], "2024-01-01");
        assert_eq!(first["schedule"]["interval"], 6);
        assert_eq!(first["next_review"], "2024-01-07");
        assert_eq!(value[1]["schedule"]["last_review"], Value::Null);
        assert_eq!(value[1]["next_review"], Value::Null);
        Ok(())
    }
}
