// Copyright 2025 HyperZoekt Project
// Derived from sourcegraph/zoekt (https://github.com/sourcegraph/zoekt)
// Copyright 2016 Google Inc. All rights reserved.
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

//! N-gram boolean queries for regex candidate filtering.
//!
//! A regex is analyzed into a tree of gram terms joined by AND/OR, the tree
//! is normalized to Disjunctive Normal Form and simplified, and the result is
//! emitted as a boolean query string a full-text index can evaluate before
//! the exact (expensive) regex scan runs on the surviving documents.

pub mod config;
pub mod error;
pub mod gram;
pub mod query;
pub mod regex_analyze;

pub use crate::config::{load_config, GramConfig, MergeOpts};
pub use crate::error::GramQueryError;
pub use crate::gram::{extract_grams, grams, DEFAULT_GRAM_LENGTH};
pub use crate::query::{GramBuilder, GramQuery, QueryOp, MATCH_ALL_TOKEN};
pub use crate::regex_analyze::RegexTranslator;

/// Convenience one-shot translation with the default configuration.
pub fn regex_to_query_string(pattern: &str) -> Result<String, GramQueryError> {
    RegexTranslator::new(GramConfig::default())?.translate_to_query_string(pattern)
}
