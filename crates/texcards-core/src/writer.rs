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

//! Writing repetition records back into a document.
//!
//! Only metadata lines of the updated cards are touched. Every other byte of
//! the document, including other cards' metadata, comes out unchanged.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::parser::METADATA_PREFIX;
use crate::parser::scan_blocks;
use crate::types::aliases::CardId;
use crate::types::record::RepetitionRecord;

/// Rewrite `text` so that each card in `updates` has exactly one metadata
/// line, placed on the line after its end marker.
///
/// Existing metadata lines for those cards are removed wherever they are.
/// A card whose block can't be found loses its stale metadata and gets no
/// new line.
pub fn rewrite(text: &str, updates: &BTreeMap<CardId, RepetitionRecord>) -> String {
    let ids: HashSet<&str> = updates
        .keys()
        .map(String::as_str)
        .filter(|id| {
            let storable = !id.is_empty() && !id.contains([':', '\n', '\r']);
            if !storable {
                log::warn!("Card id {id:?} can't be stored in a metadata comment; skipping.");
            }
            storable
        })
        .collect();
    if ids.is_empty() {
        return text.to_string();
    }

    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let stripped = strip_metadata(text, &ids);

    // (offset, text) pairs, applied in offset order.
    let mut inserts: Vec<(usize, String)> = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();
    for block in scan_blocks(&stripped).blocks {
        if !ids.contains(block.id) || !placed.insert(block.id) {
            continue;
        }
        let token = format!("{METADATA_PREFIX}{}:{}", block.id, updates[block.id].encode());
        inserts.push(placement(&stripped, block.end, &token, newline));
    }
    inserts.sort_by_key(|(offset, _)| *offset);

    let mut out = String::with_capacity(stripped.len() + inserts.len() * 48);
    let mut copied = 0;
    for (offset, insert) in inserts {
        out.push_str(&stripped[copied..offset]);
        out.push_str(&insert);
        copied = offset;
    }
    out.push_str(&stripped[copied..]);

    for id in ids.difference(&placed) {
        log::debug!("No flashcard block for card '{id}'; metadata not written.");
    }
    out
}

/// Where the metadata line for a block ending at `end` goes, and the text to
/// insert there. The token always gets a line of its own: if anything
/// follows the end marker on its line, the token goes after that line.
fn placement(text: &str, end: usize, token: &str, newline: &str) -> (usize, String) {
    let line_end = text[end..].find('\n').map(|i| end + i);
    let rest = &text[end..line_end.unwrap_or(text.len())];
    if rest.trim_end_matches('\r').is_empty() {
        return (end, format!("{newline}{token}"));
    }
    match line_end {
        Some(i) => (i + 1, format!("{token}{newline}")),
        None => (text.len(), format!("{newline}{token}")),
    }
}

/// Drop the metadata of the given cards. A line holding nothing but the
/// token goes away entirely; a token trailing other text is cut off at the
/// end of the line, leaving the line break.
fn strip_metadata(text: &str, ids: &HashSet<&str>) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let Some(col) = line.find(METADATA_PREFIX) else {
            out.push_str(line);
            continue;
        };
        let owned = line[col + METADATA_PREFIX.len()..]
            .split_once(':')
            .is_some_and(|(id, _)| ids.contains(id));
        if !owned {
            out.push_str(line);
            continue;
        }
        let content = line.trim_end_matches(['\n', '\r']);
        let ending = &line[content.len()..];
        if line[..col].trim().is_empty() {
            // The final line has no terminator of its own, so take the
            // previous line's instead.
            if ending.is_empty() {
                if out.ends_with('\n') {
                    out.pop();
                    if out.ends_with('\r') {
                        out.pop();
                    }
                }
            }
        } else {
            out.push_str(&line[..col]);
            out.push_str(ending);
        }
    }
    out
}
