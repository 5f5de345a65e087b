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

//! The deck: every card of a collection, plus the bookkeeping needed to
//! write reviews back into the documents they came from.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs::read_to_string;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::collection::CollectionConfig;
use crate::collection::find_card_files;
use crate::error::DocumentError;
use crate::error::Fallible;
use crate::error::fail;
use crate::parser::Diagnostic;
use crate::parser::parse_document;
use crate::sm2;
use crate::types::aliases::CardId;
use crate::types::card::Card;
use crate::types::date::Date;
use crate::types::document_hash::DocumentHash;
use crate::types::quality::Quality;
use crate::types::record::RepetitionRecord;
use crate::writer::rewrite;

/// A document the deck was loaded from.
struct Source {
    path: PathBuf,
    /// Hash of the text as last read or written by us.
    hash: DocumentHash,
}

#[derive(Default)]
pub struct Deck {
    /// In load order: documents in the order given, cards in document order.
    cards: Vec<Card>,
    sources: Vec<Source>,
    diagnostics: Vec<Diagnostic>,
    /// Indices of cards reviewed since the last successful save.
    dirty: BTreeSet<usize>,
}

/// Outcome of [`Deck::save`].
#[derive(Debug, Default)]
pub struct SaveReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<DocumentError>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every card document in `directory`. Documents that can't be read
    /// are returned alongside the deck; only a missing directory or a broken
    /// configuration fails outright.
    pub fn load_directory(
        directory: &Path,
        config: &CollectionConfig,
    ) -> Fallible<(Deck, Vec<DocumentError>)> {
        let files = find_card_files(directory, config)?;
        Ok(Self::load_files(files))
    }

    /// Load the given documents, in order.
    pub fn load_files<I, P>(paths: I) -> (Deck, Vec<DocumentError>)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut deck = Deck::new();
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match read_to_string(path) {
                Ok(text) => deck.add_document(path, &text),
                Err(e) => {
                    log::warn!("Failed to read {}: {e}", path.display());
                    failures.push(DocumentError::new(path, e.into()));
                }
            }
        }
        (deck, failures)
    }

    /// Parse `text` as the contents of `path` and append its cards.
    pub fn add_document(&mut self, path: &Path, text: &str) {
        if self.sources.iter().any(|s| s.path == path) {
            log::warn!("{} is already loaded; ignoring it.", path.display());
            return;
        }
        let parsed = parse_document(text, path);
        for card in parsed.cards.iter() {
            if let Some(other) = self.find_by_id(card.id()) {
                log::warn!(
                    "Card id '{}' in {} is also used in {}; lookups by id find the first.",
                    card.id(),
                    path.display(),
                    other.source().display()
                );
            }
        }
        log::info!("Loaded {} cards from {}", parsed.cards.len(), path.display());
        self.cards.extend(parsed.cards);
        self.diagnostics.extend(parsed.diagnostics);
        self.sources.push(Source {
            path: path.to_path_buf(),
            hash: DocumentHash::of(text),
        });
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn source_files(&self) -> Vec<&Path> {
        self.sources.iter().map(|s| s.path.as_path()).collect()
    }

    /// Everything the parser skipped while loading.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Distinct section names, sorted.
    pub fn sections_present(&self) -> Vec<&str> {
        let sections: BTreeSet<&str> = self.cards.iter().map(|c| c.section()).collect();
        sections.into_iter().collect()
    }

    pub fn cards_in(&self, section: &str) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.section() == section).collect()
    }

    pub fn due_cards(&self, today: Date) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.is_due(today)).collect()
    }

    /// The first card with this id, in load order.
    pub fn find_by_id(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == id)
    }

    /// Apply a review to the card at `index` and mark it for the next save.
    pub fn record_review(
        &mut self,
        index: usize,
        quality: Quality,
        today: Date,
    ) -> Fallible<&Card> {
        let Some(card) = self.cards.get_mut(index) else {
            return fail(format!("no card at index {index}"));
        };
        let schedule: RepetitionRecord = sm2::update(card.schedule(), quality, today);
        card.set_schedule(schedule);
        self.dirty.insert(index);
        Ok(&self.cards[index])
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Write the records of all reviewed cards back into their documents.
    ///
    /// Each document is re-read right before it is rewritten, so edits made
    /// since loading survive. The new text replaces the file atomically.
    /// Failures are per document: the others are still saved, and the
    /// failed document's cards stay marked for the next attempt.
    pub fn save(&mut self) -> SaveReport {
        let mut groups: BTreeMap<usize, (BTreeMap<CardId, RepetitionRecord>, Vec<usize>)> =
            BTreeMap::new();
        for &index in self.dirty.iter() {
            let card = &self.cards[index];
            let Some(source) = self.sources.iter().position(|s| s.path == card.source()) else {
                continue;
            };
            let (updates, indices) = groups.entry(source).or_default();
            updates.insert(card.id().to_string(), *card.schedule());
            indices.push(index);
        }

        let mut report = SaveReport::default();
        for (source, (updates, indices)) in groups {
            let source = &mut self.sources[source];
            match save_document(source, &updates) {
                Ok(written) => {
                    if written {
                        report.written.push(source.path.clone());
                    }
                    for index in indices {
                        self.dirty.remove(&index);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to save {}: {e}", source.path.display());
                    report.failures.push(DocumentError::new(source.path.clone(), e));
                }
            }
        }
        report
    }
}

/// Merge `updates` into the current text of `source`. Returns whether the
/// file had to be written.
fn save_document(
    source: &mut Source,
    updates: &BTreeMap<CardId, RepetitionRecord>,
) -> Fallible<bool> {
    let current = read_to_string(&source.path)?;
    let current_hash = DocumentHash::of(&current);
    if current_hash != source.hash {
        log::warn!(
            "{} changed on disk since it was loaded (hash {} -> {current_hash}); merging review data into the new text.",
            source.path.display(),
            source.hash
        );
    }
    let text = rewrite(&current, updates);
    if text == current {
        source.hash = current_hash;
        return Ok(false);
    }
    write_atomically(&source.path, &text)?;
    source.hash = DocumentHash::of(&text);
    log::info!("Saved {} review records to {}", updates.len(), source.path.display());
    Ok(true)
}

/// Replace the file at `path` with `text` via a temporary file in the same
/// directory, keeping the original permissions.
fn write_atomically(path: &Path, text: &str) -> Fallible<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }
    file.persist(path)?;
    Ok(())
}
