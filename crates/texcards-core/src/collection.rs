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

//! Locating card documents inside a collection directory.

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;

/// Optional per-collection settings, read from the collection root.
pub const CONFIG_FILE: &str = "texcards.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Extension of card documents, without the dot.
    pub extension: String,
    /// Suffix every card document's file stem must end with.
    pub suffix: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            extension: "tex".to_string(),
            suffix: "_cards".to_string(),
        }
    }
}

impl CollectionConfig {
    /// Read the configuration of the collection at `directory`. A missing
    /// file means the defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = read_to_string(&path)?;
        let config: Self = toml::from_str(&text)?;
        if config.extension.is_empty() {
            return fail(format!("{}: extension must not be empty", path.display()));
        }
        Ok(config)
    }

    /// Whether `path` names a card document, i.e. `*<suffix>.<extension>`.
    /// Hidden files never match.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let pattern = format!("{}.{}", self.suffix, self.extension);
        !name.starts_with('.') && name.ends_with(&pattern)
    }
}

/// The card documents directly inside `directory`, sorted by name.
pub fn find_card_files(directory: &Path, config: &CollectionConfig) -> Fallible<Vec<PathBuf>> {
    if !directory.is_dir() {
        return fail("directory does not exist.");
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && config.matches(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
