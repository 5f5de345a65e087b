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

use std::env::current_dir;
use std::path::PathBuf;

use texcards_core::CollectionConfig;
use texcards_core::Deck;
use texcards_core::DocumentError;
use texcards_core::Fallible;
use texcards_core::fail;

/// A loaded collection directory.
pub struct Collection {
    pub directory: PathBuf,
    pub deck: Deck,
    /// Documents that matched the naming convention but couldn't be read.
    pub failures: Vec<DocumentError>,
}

impl Collection {
    /// Load the collection at `directory`, or the current working directory
    /// if none is given.
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(directory) => PathBuf::from(directory),
            None => current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory: PathBuf = directory.canonicalize()?;
        let config = CollectionConfig::load(&directory)?;
        let (deck, failures) = Deck::load_directory(&directory, &config)?;
        log::debug!(
            "Loaded {} cards from {} documents in {}",
            deck.len(),
            deck.source_files().len(),
            directory.display()
        );
        Ok(Self {
            directory,
            deck,
            failures,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs::write;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    pub const ALGEBRA: &str = "\\section{Algebra}
\\begin{flashcard}{quadratic}
  \\Q{Roots of $x^2 - 5x + 6$?}
  \\A{$2$ and $3$}
\\end{flashcard}
%@rep:quadratic:2024-01-01:6:2.60:2
\\begin{flashcard}{linear}
  \\Q{Solve $2x = 4$.}
  \\A{$x = 2$}
\\end{flashcard}
\\begin{flashcard}{broken}
  \\Q{No answer.}
\\end{flashcard}
";

    pub const GEOMETRY: &str = "\\begin{flashcard}{pythagoras}
  \\Q{$a^2 + b^2 = ?$}
  \\A{$c^2$}
\\end{flashcard}
";

    /// A temporary collection with two card documents.
    pub fn create_test_collection() -> Fallible<TempDir> {
        let dir = tempdir()?;
        write(dir.path().join("algebra_cards.tex"), ALGEBRA)?;
        write(dir.path().join("geometry_cards.tex"), GEOMETRY)?;
        Ok(dir)
    }

    pub fn path_string(dir: &TempDir) -> Option<String> {
        Some(dir.path().display().to_string())
    }

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: directory does not exist.".to_string())
        );
    }

    #[test]
    fn test_load() -> Fallible<()> {
        let dir = create_test_collection()?;
        let collection = Collection::new(path_string(&dir))?;
        assert_eq!(collection.deck.len(), 3);
        assert_eq!(collection.deck.diagnostics().len(), 1);
        assert!(collection.failures.is_empty());
        Ok(())
    }
}
