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

use clap::ValueEnum;
use serde::Serialize;
use texcards_core::Date;
use texcards_core::Deck;
use texcards_core::Fallible;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct Stats {
    documents: usize,
    cards: usize,
    due: usize,
    sections: Vec<SectionStats>,
}

#[derive(Serialize, Debug, PartialEq)]
struct SectionStats {
    name: String,
    cards: usize,
    due: usize,
}

pub fn print_stats(directory: Option<String>, format: StatsFormat, today: Date) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let stats = compute_stats(&collection.deck, today);
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn compute_stats(deck: &Deck, today: Date) -> Stats {
    let sections = deck
        .sections_present()
        .into_iter()
        .map(|name| {
            let cards = deck.cards_in(name);
            SectionStats {
                name: name.to_string(),
                cards: cards.len(),
                due: cards.iter().filter(|c| c.is_due(today)).count(),
            }
        })
        .collect();
    Stats {
        documents: deck.source_files().len(),
        cards: deck.len(),
        due: deck.due_cards(today).len(),
        sections,
    }
}

fn render_text(stats: &Stats) -> String {
    let mut out = format!(
        "Documents: {}\nCards: {} ({} due)\n",
        stats.documents, stats.cards, stats.due
    );
    let width = stats.sections.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for section in stats.sections.iter() {
        out.push_str(&format!(
            "  {:<width$}  {} cards, {} due\n",
            section.name, section.cards, section.due
        ));
    }
    out
}
