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

//! texcards-core: the card store behind texcards.
//!
//! Flashcards live inside ordinary LaTeX documents:
//!
//! ```latex
//! \section{Algebra}
//! \begin{flashcard}{quadratic}
//!   \Q{Roots of $x^2 - 5x + 6$?}
//!   \A{$2$ and $3$}
//! \end{flashcard}
//! %@rep:quadratic:2024-01-01:6:2.60:2
//! ```
//!
//! This library provides:
//! - Parsing cards, sections and review metadata out of a document
//! - SM-2 scheduling
//! - Writing review metadata back without touching anything else
//! - A deck that loads a collection directory and saves reviews

pub mod collection;
pub mod deck;
pub mod error;
#[cfg(test)]
mod helper;
pub mod parser;
pub mod sm2;
pub mod types;
pub mod writer;

// Re-exports for convenience
pub use collection::{CollectionConfig, find_card_files};
pub use deck::{Deck, SaveReport};
pub use error::{DocumentError, ErrorReport, Fallible, fail};
pub use parser::{Diagnostic, ParsedDocument, parse_document};
pub use types::card::{Card, DEFAULT_SECTION};
pub use types::date::Date;
pub use types::quality::Quality;
pub use types::record::RepetitionRecord;
pub use writer::rewrite;
