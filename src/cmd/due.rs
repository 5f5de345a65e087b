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

use texcards_core::Card;
use texcards_core::Date;
use texcards_core::Deck;
use texcards_core::Fallible;

use crate::collection::Collection;

pub fn list_due(directory: Option<String>, section: Option<String>, today: Date) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let due = due_cards(&collection.deck, section.as_deref(), today);
    if due.is_empty() {
        println!("No cards due today.");
        return Ok(());
    }
    for card in due {
        println!("[{}] {}", card.section(), card.id());
    }
    Ok(())
}

fn due_cards<'a>(deck: &'a Deck, section: Option<&str>, today: Date) -> Vec<&'a Card> {
    deck.due_cards(today)
        .into_iter()
        .filter(|card| section.is_none_or(|s| card.section() == s))
        .collect()
}
