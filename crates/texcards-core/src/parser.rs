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

//! Extraction of cards, sections and repetition records from LaTeX text.
//!
//! The parser never fails. Anything it cannot make sense of is skipped and
//! reported as a [`Diagnostic`].

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use crate::types::aliases::CardId;
use crate::types::card::Card;
use crate::types::card::DEFAULT_SECTION;
use crate::types::record::RepetitionRecord;

pub const SECTION_COMMAND: &str = "\\section";
pub const BEGIN_MARKER: &str = "\\begin{flashcard}";
pub const END_MARKER: &str = "\\end{flashcard}";
pub const METADATA_PREFIX: &str = "%@rep:";

/// Something the parser skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub source_path: PathBuf,
    /// 1-based.
    pub line_num: usize,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Location: {}:{}",
            self.message,
            self.source_path.display(),
            self.line_num
        )
    }
}

/// The result of parsing one document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Accepted cards, in document order.
    pub cards: Vec<Card>,
    /// Every decodable-or-not metadata token, by card id. Later tokens
    /// overwrite earlier ones.
    pub records: HashMap<CardId, RepetitionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a single document. `source` is recorded on every card so the deck
/// knows where to write it back.
pub fn parse_document(text: &str, source: &Path) -> ParsedDocument {
    Parser::new(source.to_path_buf()).parse(text)
}

pub struct Parser {
    source: PathBuf,
}

impl Parser {
    pub fn new(source: PathBuf) -> Self {
        Parser { source }
    }

    pub fn parse(&self, text: &str) -> ParsedDocument {
        let lines = LineIndex::new(text);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut report = |message: String, offset: usize| {
            diagnostics.push(Diagnostic {
                message,
                source_path: self.source.clone(),
                line_num: lines.line_of(offset),
            });
        };

        let mut records: HashMap<CardId, RepetitionRecord> = HashMap::new();
        for token in scan_metadata(text) {
            match token {
                Ok(token) => {
                    let (record, error) = RepetitionRecord::decode(token.payload);
                    if let Some(e) = error {
                        report(
                            format!(
                                "Malformed repetition record for card '{}' ({}); using defaults.",
                                token.id,
                                e.message()
                            ),
                            token.start,
                        );
                    }
                    records.insert(token.id.to_string(), record);
                }
                Err(offset) => {
                    report("Metadata comment without a card id.".to_string(), offset);
                }
            }
        }

        let sections: Vec<(usize, &str)> = scan_sections(text);
        let scan = scan_blocks(text);
        for problem in scan.problems {
            let message = match problem.kind {
                BlockProblem::MissingId => "Flashcard begin marker without an id argument.",
                BlockProblem::EmptyId => "Flashcard with an empty id.",
                BlockProblem::Unterminated => "Flashcard begin marker without a matching end marker.",
            };
            report(message.to_string(), problem.offset);
        }

        let mut cards: Vec<Card> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for block in scan.blocks {
            let body: &str = &text[block.body.clone()];
            let question = command_argument(body, "Q").unwrap_or_default();
            let answer = command_argument(body, "A").unwrap_or_default();
            if question.is_empty() || answer.is_empty() {
                let missing = if question.is_empty() { "question" } else { "answer" };
                log::debug!(
                    "{}: skipping card '{}' without {missing}",
                    self.source.display(),
                    block.id
                );
                report(format!("Card '{}' has no {missing}; skipped.", block.id), block.start);
                continue;
            }
            if !seen.insert(block.id) {
                report(
                    format!("Duplicate card id '{}'; only the first is used.", block.id),
                    block.start,
                );
                continue;
            }
            let section = section_at(&sections, block.start);
            let schedule = records.get(block.id).copied().unwrap_or_default();
            cards.push(Card::new(
                block.id.to_string(),
                question.to_string(),
                answer.to_string(),
                section.to_string(),
                self.source.clone(),
                lines.line_of(block.start),
                schedule,
            ));
        }

        let known: HashSet<&str> = cards.iter().map(|c| c.id()).collect();
        let mut orphans: Vec<&str> = records
            .keys()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        orphans.sort_unstable();
        for id in orphans {
            let offset = text.find(&format!("{METADATA_PREFIX}{id}:")).unwrap_or(0);
            report(format!("Repetition record for unknown card '{id}'."), offset);
        }

        ParsedDocument {
            cards,
            records,
            diagnostics,
        }
    }
}

/// The section in effect at `offset`: the last marker strictly before it.
fn section_at<'a>(sections: &[(usize, &'a str)], offset: usize) -> &'a str {
    let idx = sections.partition_point(|(start, _)| *start < offset);
    match idx {
        0 => DEFAULT_SECTION,
        _ => sections[idx - 1].1,
    }
}

/// All `\section{...}` markers as (offset, name), in document order.
fn scan_sections(text: &str) -> Vec<(usize, &str)> {
    let mut sections = Vec::new();
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(SECTION_COMMAND) {
        let start = pos + rel;
        let after = start + SECTION_COMMAND.len();
        if let Some(arg) = argument_at(text, after) {
            let name = text[arg.clone()].trim();
            if !name.is_empty() {
                sections.push((start, name));
            }
        }
        pos = after;
    }
    sections
}

/// A `\begin{flashcard}{id} ... \end{flashcard}` span.
pub(crate) struct Block<'a> {
    pub id: &'a str,
    /// Offset of the begin marker.
    pub start: usize,
    /// Everything strictly between the id argument and the end marker.
    pub body: Range<usize>,
    /// Offset just past the end marker.
    pub end: usize,
}

pub(crate) enum BlockProblem {
    MissingId,
    EmptyId,
    Unterminated,
}

pub(crate) struct Problem {
    pub kind: BlockProblem,
    pub offset: usize,
}

pub(crate) struct BlockScan<'a> {
    pub blocks: Vec<Block<'a>>,
    pub problems: Vec<Problem>,
}

/// Find card blocks. Each block ends at the first end marker after its
/// begin marker; scanning resumes after that end marker.
pub(crate) fn scan_blocks(text: &str) -> BlockScan<'_> {
    let mut blocks = Vec::new();
    let mut problems = Vec::new();
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(BEGIN_MARKER) {
        let start = pos + rel;
        let after = start + BEGIN_MARKER.len();
        let Some(arg) = argument_at(text, after) else {
            problems.push(Problem {
                kind: BlockProblem::MissingId,
                offset: start,
            });
            pos = after;
            continue;
        };
        let body_start = arg.end + 1;
        let Some(rel_end) = text[body_start..].find(END_MARKER) else {
            problems.push(Problem {
                kind: BlockProblem::Unterminated,
                offset: start,
            });
            break;
        };
        let body_end = body_start + rel_end;
        let end = body_end + END_MARKER.len();
        let id = text[arg].trim();
        if id.is_empty() {
            problems.push(Problem {
                kind: BlockProblem::EmptyId,
                offset: start,
            });
        } else {
            blocks.push(Block {
                id,
                start,
                body: body_start..body_end,
                end,
            });
        }
        pos = end;
    }
    BlockScan { blocks, problems }
}

/// A `%@rep:<id>:<payload>` comment.
pub(crate) struct MetadataToken<'a> {
    pub id: &'a str,
    pub payload: &'a str,
    /// Offset of the `%`.
    pub start: usize,
}

/// Find metadata tokens, at most one per line: the payload runs to the end
/// of the line. Tokens without an id yield the offending offset instead.
pub(crate) fn scan_metadata(text: &str) -> Vec<Result<MetadataToken<'_>, usize>> {
    let mut tokens = Vec::new();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        if let Some(col) = line.find(METADATA_PREFIX) {
            let start = line_start + col;
            let rest = line[col + METADATA_PREFIX.len()..].trim_end_matches(['\n', '\r']);
            match rest.split_once(':') {
                Some((id, payload)) if !id.is_empty() => tokens.push(Ok(MetadataToken {
                    id,
                    payload,
                    start,
                })),
                _ => tokens.push(Err(start)),
            }
        }
        line_start += line.len();
    }
    tokens
}

/// The first `\<name>{...}` or `\<name>block{...}` argument in `body`,
/// trimmed.
fn command_argument<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let command = format!("\\{name}");
    let mut pos = 0;
    while let Some(rel) = body[pos..].find(&command) {
        let mut after = pos + rel + command.len();
        if body[after..].starts_with("block") {
            after += "block".len();
        }
        if let Some(arg) = argument_at(body, after) {
            return Some(body[arg].trim());
        }
        pos = after;
    }
    None
}

/// If a brace group opens exactly at `offset`, the range of its contents.
///
/// Braces nest to any depth. A backslash escapes the following character,
/// so `\{`, `\}` and `\\` never open or close a group.
pub(crate) fn argument_at(text: &str, offset: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    if bytes.get(offset) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = offset;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset + 1..i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|start| *start <= offset)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::date::Date;

    fn parse(text: &str) -> ParsedDocument {
        parse_document(text, Path::new("test_cards.tex"))
    }

    fn card(id: &str, q: &str, a: &str) -> String {
        format!("\\begin{{flashcard}}{{{id}}}\n\\Q{{{q}}}\n\\A{{{a}}}\n\\end{{flashcard}}\n")
    }

    #[test]
    fn test_empty_string() {
        let doc = parse("");
        assert!(doc.cards.is_empty());
        assert!(doc.records.is_empty());
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_basic_card() {
        let doc = parse(&card("rust", "What is Rust?", "A systems programming language."));
        assert_eq!(doc.cards.len(), 1);
        let card = &doc.cards[0];
        assert_eq!(card.id(), "rust");
        assert_eq!(card.question(), "What is Rust?");
        assert_eq!(card.answer(), "A systems programming language.");
        assert_eq!(card.section(), DEFAULT_SECTION);
        assert_eq!(card.source(), Path::new("test_cards.tex"));
        assert_eq!(card.line(), 1);
        assert_eq!(*card.schedule(), RepetitionRecord::default());
    }

    #[test]
    fn test_block_forms_and_whitespace() {
        let text = "\\begin{flashcard}{ q-1 }\n  \\Qblock{\n    Solve $x^2 = 4$.\n  }\n  \\Ablock{ $x = \\pm 2$ }\n\\end{flashcard}";
        let doc = parse(text);
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].id(), "q-1");
        assert_eq!(doc.cards[0].question(), "Solve $x^2 = 4$.");
        assert_eq!(doc.cards[0].answer(), "$x = \\pm 2$");
    }

    #[test]
    fn test_nested_braces_preserved() {
        let text = card("frac", "Simplify \\frac{\\textbf{a}}{b}", "\\emph{it} {is {deep}}");
        let doc = parse(&text);
        assert_eq!(doc.cards[0].question(), "Simplify \\frac{\\textbf{a}}{b}");
        assert_eq!(doc.cards[0].answer(), "\\emph{it} {is {deep}}");
    }

    #[test]
    fn test_escaped_braces() {
        let text = card("set", "The set \\{1, 2\\}", "Closing \\} only");
        let doc = parse(&text);
        assert_eq!(doc.cards[0].question(), "The set \\{1, 2\\}");
        assert_eq!(doc.cards[0].answer(), "Closing \\} only");
    }

    #[test]
    fn test_sections() {
        let text = format!(
            "{}\\section{{Algebra}}\n{}\\section{{Geometry}}\n{}{}\\section{{Empty}}\n",
            card("g", "q", "a"),
            card("alg", "q", "a"),
            card("geo1", "q", "a"),
            card("geo2", "q", "a"),
        );
        let doc = parse(&text);
        let sections: Vec<(&str, &str)> = doc.cards.iter().map(|c| (c.id(), c.section())).collect();
        assert_eq!(
            sections,
            vec![
                ("g", "General"),
                ("alg", "Algebra"),
                ("geo1", "Geometry"),
                ("geo2", "Geometry"),
            ]
        );
    }

    #[test]
    fn test_subsection_is_not_a_section() {
        let text = format!("\\section{{Top}}\n\\subsection{{Sub}}\n{}", card("c", "q", "a"));
        let doc = parse(&text);
        assert_eq!(doc.cards[0].section(), "Top");
    }

    #[test]
    fn test_missing_answer_skips_only_that_card() {
        let text = format!(
            "\\begin{{flashcard}}{{bad}}\n\\Q{{No answer here}}\n\\end{{flashcard}}\n{}",
            card("good", "q", "a")
        );
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].id(), "good");
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].line_num, 1);
        assert!(doc.diagnostics[0].message.contains("'bad' has no answer"));
    }

    #[test]
    fn test_empty_question_skipped() {
        let doc = parse(&card("blank", "   ", "a"));
        assert!(doc.cards.is_empty());
    }

    #[test]
    fn test_unterminated_block() {
        let text = format!("{}\\begin{{flashcard}}{{open}}\n\\Q{{q}}\\A{{a}}\n", card("ok", "q", "a"));
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].line_num, 5);
    }

    #[test]
    fn test_block_without_id() {
        let text = format!("\\begin{{flashcard}}\n\\end{{flashcard}}\n{}", card("ok", "q", "a"));
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].id(), "ok");
        assert_eq!(doc.diagnostics.len(), 1);
    }

    #[test]
    fn test_records_attached() {
        let text = format!(
            "{}%@rep:first:2024-01-02:6:2.60:2\n{}",
            card("first", "q1", "a1"),
            card("second", "q2", "a2")
        );
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 2);
        assert_eq!(
            *doc.cards[0].schedule(),
            RepetitionRecord {
                last_review: Some(Date::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())),
                interval: 6,
                ease_factor: 2.6,
                repetition_streak: 2,
            }
        );
        assert_eq!(*doc.cards[1].schedule(), RepetitionRecord::default());
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_last_record_wins() {
        let text = format!(
            "%@rep:c:2024-01-01:1:2.50:1\n{}%@rep:c:2024-02-01:6:2.60:2\n",
            card("c", "q", "a")
        );
        let doc = parse(&text);
        assert_eq!(doc.cards[0].schedule().interval, 6);
        assert_eq!(doc.records.len(), 1);
    }

    #[test]
    fn test_malformed_record_defaults() {
        let text = format!("{}%@rep:c:garbage\n", card("c", "q", "a"));
        let doc = parse(&text);
        assert_eq!(*doc.cards[0].schedule(), RepetitionRecord::default());
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].line_num, 5);
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        let text = format!("{}%@rep:C:2024-01-01:1:2.50:1\n", card("c", "q", "a"));
        let doc = parse(&text);
        assert!(doc.cards[0].schedule().is_new());
        assert!(doc.diagnostics[0].message.contains("unknown card 'C'"));
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let text = format!("{}{}", card("dup", "first", "a"), card("dup", "second", "a"));
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].question(), "first");
        assert_eq!(doc.diagnostics.len(), 1);
    }

    #[test]
    fn test_comments_between_cards() {
        let text = format!(
            "% a comment with {{unbalanced\n{}% \\Q{{not a question}}\n{}",
            card("one", "q1", "a1"),
            card("two", "q2", "a2")
        );
        let doc = parse(&text);
        assert_eq!(doc.cards.len(), 2);
        assert_eq!(doc.cards[1].question(), "q2");
        assert_eq!(doc.cards[1].line(), 7);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            message: "Card 'x' has no answer; skipped.".to_string(),
            source_path: PathBuf::from("a_cards.tex"),
            line_num: 3,
        };
        assert_eq!(
            diagnostic.to_string(),
            "Card 'x' has no answer; skipped. Location: a_cards.tex:3"
        );
    }

    #[test]
    fn test_argument_at() {
        let text = "x{a{b}c}d";
        assert_eq!(argument_at(text, 1), Some(2..7));
        assert_eq!(argument_at(text, 0), None);
        assert_eq!(argument_at("{open", 0), None);
    }
}
