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

use clap::Parser;
use texcards_core::Date;
use texcards_core::Fallible;

use crate::cmd::check::check_collection;
use crate::cmd::due::list_due;
use crate::cmd::export::export_collection;
use crate::cmd::review::review_card;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Report cards and metadata that could not be parsed.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// List the cards due today.
    Due {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only list cards from this section.
        #[arg(long)]
        section: Option<String>,
    },
    /// Record a review of one card and save it.
    Review {
        /// The card's id.
        id: String,
        /// Recall quality, from 0 (blackout) to 5 (perfect).
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        quality: u8,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Export a collection as JSON.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let today: Date = Date::today();
    match cli {
        Command::Check { directory } => check_collection(directory),
        Command::Stats { directory, format } => print_stats(directory, format, today),
        Command::Due { directory, section } => list_due(directory, section, today),
        Command::Review {
            id,
            quality,
            directory,
        } => review_card(directory, &id, quality, today),
        Command::Export { directory, output } => export_collection(directory, output),
    }
}
