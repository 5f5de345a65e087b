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

use texcards_core::Fallible;
use texcards_core::fail;

use crate::collection::Collection;

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    for line in check_report(&collection) {
        println!("{line}");
    }
    if !collection.failures.is_empty() {
        return fail(format!(
            "{} document(s) could not be read.",
            collection.failures.len()
        ));
    }
    Ok(())
}

fn check_report(collection: &Collection) -> Vec<String> {
    let deck = &collection.deck;
    let mut lines: Vec<String> = Vec::new();
    for failure in collection.failures.iter() {
        lines.push(format!("unreadable: {failure}"));
    }
    for diagnostic in deck.diagnostics() {
        lines.push(format!("skipped: {diagnostic}"));
    }
    lines.push(format!(
        "{} cards in {} documents, {} problems.",
        deck.len(),
        deck.source_files().len(),
        collection.failures.len() + deck.diagnostics().len()
    ));
    lines
}
