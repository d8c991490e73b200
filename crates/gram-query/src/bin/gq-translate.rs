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

use anyhow::Result;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gram_query::{load_config, GramConfig, MergeOpts, RegexTranslator};

#[derive(Parser, Debug)]
#[command(
    name = "gq-translate",
    about = "Translate regex patterns into n-gram boolean queries"
)]
struct Args {
    /// Patterns to translate. Read one per line from stdin when omitted.
    patterns: Vec<String>,
    /// TOML config file (gram_length, max_disjuncts, match_all_token, fold_case, nest_limit)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Gram length of the target index
    #[arg(long)]
    gram_length: Option<usize>,
    /// Cap on DNF disjuncts
    #[arg(long)]
    max_disjuncts: Option<usize>,
    /// Token emitted when no gram constraint applies
    #[arg(long)]
    match_all: Option<String>,
    /// Lowercase literals before extracting grams
    #[arg(long)]
    fold_case: bool,
    /// Maximum regex nesting depth
    #[arg(long)]
    nest_limit: Option<u32>,
    /// Print the normalized tree instead of the query string
    #[arg(long)]
    tree: bool,
    /// Emit JSON (NDJSON)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let opts = MergeOpts {
        config_path: args.config.clone(),
        cli_gram_length: args.gram_length,
        cli_max_disjuncts: args.max_disjuncts,
        cli_match_all_token: args.match_all.clone(),
        cli_fold_case: args.fold_case.then_some(true),
        cli_nest_limit: args.nest_limit,
    };
    let config = load_config(GramConfig::default(), opts)?;
    let translator = RegexTranslator::new(config)?;

    let mut total = 0usize;
    let mut failed = 0usize;
    if args.patterns.is_empty() {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            total += 1;
            if !emit(&translator, &args, &line)? {
                failed += 1;
            }
        }
    } else {
        for pattern in &args.patterns {
            total += 1;
            if !emit(&translator, &args, pattern)? {
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} patterns failed to translate", failed, total);
    }
    Ok(())
}

/// Prints one result; `Ok(false)` when the pattern could not be translated.
fn emit(translator: &RegexTranslator, args: &Args, pattern: &str) -> Result<bool> {
    let query = match translator.translate(pattern) {
        Ok(q) => q,
        Err(e) => {
            // keep going on the remaining patterns
            tracing::error!(pattern, error = %e, "failed to translate pattern");
            if args.json {
                let obj = serde_json::json!({ "pattern": pattern, "error": e.to_string() });
                println!("{}", serde_json::to_string(&obj)?);
            }
            return Ok(false);
        }
    };
    let query_string = query.to_query_string_with(&translator.config().match_all_token);
    if args.json {
        let obj = serde_json::json!({
            "pattern": pattern,
            "query": query_string,
            "tree": query,
        });
        println!("{}", serde_json::to_string(&obj)?);
    } else if args.tree {
        print!("{}", query.pretty_tree());
    } else {
        println!("{}", query_string);
    }
    Ok(true)
}
