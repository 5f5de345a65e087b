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

/// Fingerprint of a document's text, used to notice when a file was edited
/// on disk between loading and saving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DocumentHash {
    inner: blake3::Hash,
}

impl DocumentHash {
    pub fn of(text: &str) -> Self {
        Self {
            inner: blake3::hash(text.as_bytes()),
        }
    }
}

impl Display for DocumentHash {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.inner.to_hex())
    }
}
