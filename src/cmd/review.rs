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

use texcards_core::Date;
use texcards_core::Fallible;
use texcards_core::Quality;
use texcards_core::fail;

use crate::collection::Collection;

pub fn review_card(directory: Option<String>, id: &str, quality: u8, today: Date) -> Fallible<()> {
    let next = apply_review(directory, id, Quality::new(quality)?, today)?;
    match next {
        Some(date) => println!("Next review of '{id}': {date}"),
        None => println!("Review of '{id}' recorded."),
    }
    Ok(())
}

/// Review the first card with this id and save. Returns the card's next
/// review date.
fn apply_review(
    directory: Option<String>,
    id: &str,
    quality: Quality,
    today: Date,
) -> Fallible<Option<Date>> {
    let mut collection = Collection::new(directory)?;
    let deck = &mut collection.deck;
    let Some(index) = deck.position(id) else {
        return fail(format!("no card with id '{id}'."));
    };
    let next = deck.record_review(index, quality, today)?.next_review_date();
    let report = deck.save();
    if let Some(failure) = report.failures.into_iter().next() {
        return fail(format!("failed to save review: {failure}"));
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;
    use crate::collection::tests::GEOMETRY;
    use crate::collection::tests::create_test_collection;
    use crate::collection::tests::path_string;

    #[test]
    fn test_review_writes_metadata() -> Fallible<()> {
        let dir = create_test_collection()?;
        let today: Date = "2024-01-07".parse()?;
        let next = apply_review(path_string(&dir), "quadratic", Quality::new(5)?, today)?;
        assert_eq!(next, Some("2024-01-23".parse()?));

        let text = read_to_string(dir.path().join("algebra_cards.tex"))?;
        assert!(text.contains("\\end{flashcard}\n%@rep:quadratic:2024-01-07:16:2.70:3\n\\begin{flashcard}{linear}"));
        assert_eq!(text.matches("%@rep:").count(), 1);
        assert_eq!(read_to_string(dir.path().join("geometry_cards.tex"))?, GEOMETRY);
        Ok(())
    }

    #[test]
    fn test_unknown_card() -> Fallible<()> {
        let dir = create_test_collection()?;
        let result = apply_review(path_string(&dir), "nope", Quality::new(3)?, "2024-01-07".parse()?);
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: no card with id 'nope'.".to_string())
        );
        Ok(())
    }
}
