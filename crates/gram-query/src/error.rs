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

use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors returned by gram query construction and regex translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GramQueryError {
    /// A configuration value is out of range (gram length 0, empty token, ...).
    InvalidConfiguration(String),
    /// A tree broke a structural invariant. Points at a combinator bug.
    StructuralViolation(String),
    /// DNF expansion would produce more disjuncts than the configured cap.
    DisjunctLimitExceeded { limit: usize },
    /// The regex could not be parsed (or exceeded the nesting limit).
    RegexParse(String),
}

impl Display for GramQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GramQueryError::InvalidConfiguration(s) => write!(f, "invalid configuration: {}", s),
            GramQueryError::StructuralViolation(s) => write!(f, "malformed query tree: {}", s),
            GramQueryError::DisjunctLimitExceeded { limit } => {
                write!(f, "dnf expansion exceeds {} disjuncts", limit)
            }
            GramQueryError::RegexParse(s) => write!(f, "regex parse error: {}", s),
        }
    }
}

impl Error for GramQueryError {}

impl From<regex_syntax::Error> for GramQueryError {
    fn from(e: regex_syntax::Error) -> Self {
        // regex-syntax already leads with "regex parse error:"; Display adds it back
        let msg = e.to_string();
        let msg = msg.strip_prefix("regex parse error:").unwrap_or(&msg).trim_start();
        GramQueryError::RegexParse(msg.to_string())
    }
}
