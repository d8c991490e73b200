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
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::error::GramQueryError;
use crate::gram::DEFAULT_GRAM_LENGTH;
use crate::query::MATCH_ALL_TOKEN;

pub const DEFAULT_MAX_DISJUNCTS: usize = 1024;
/// Same default as the regex-syntax parser.
pub const DEFAULT_NEST_LIMIT: u32 = 250;

pub const ENV_GRAM_LENGTH: &str = "GRAMQ_GRAM_LENGTH";
pub const ENV_MAX_DISJUNCTS: &str = "GRAMQ_MAX_DISJUNCTS";
pub const ENV_MATCH_ALL_TOKEN: &str = "GRAMQ_MATCH_ALL_TOKEN";
pub const ENV_FOLD_CASE: &str = "GRAMQ_FOLD_CASE";
pub const ENV_NEST_LIMIT: &str = "GRAMQ_NEST_LIMIT";

/// Settings carried by each translator instance. Nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GramConfig {
    /// Length of the index terms (3 for a trigram index).
    pub gram_length: usize,
    /// Cap on DNF disjuncts before normalization gives up.
    pub max_disjuncts: usize,
    /// Emitted when no gram constraint can be derived.
    pub match_all_token: String,
    /// Lowercase literal text before extracting grams (for indexes whose
    /// analyzer lowercases terms).
    pub fold_case: bool,
    /// Maximum regex nesting depth accepted by the parser.
    pub nest_limit: u32,
}

impl Default for GramConfig {
    fn default() -> Self {
        Self {
            gram_length: DEFAULT_GRAM_LENGTH.get(),
            max_disjuncts: DEFAULT_MAX_DISJUNCTS,
            match_all_token: MATCH_ALL_TOKEN.to_string(),
            fold_case: false,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }
}

impl GramConfig {
    pub fn validate(&self) -> Result<(), GramQueryError> {
        if self.gram_length < 1 {
            return Err(GramQueryError::InvalidConfiguration(
                "gram_length must be at least 1".to_string(),
            ));
        }
        if self.max_disjuncts < 1 {
            return Err(GramQueryError::InvalidConfiguration(
                "max_disjuncts must be at least 1".to_string(),
            ));
        }
        if self.match_all_token.trim().is_empty() {
            return Err(GramQueryError::InvalidConfiguration(
                "match_all_token must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// CLI-level options that binaries pass to `load_config`.
#[derive(Clone, Debug, Default)]
pub struct MergeOpts {
    pub config_path: Option<PathBuf>,
    pub cli_gram_length: Option<usize>,
    pub cli_max_disjuncts: Option<usize>,
    pub cli_match_all_token: Option<String>,
    pub cli_fold_case: Option<bool>,
    pub cli_nest_limit: Option<u32>,
}

// Every key is optional in the file; unknown keys are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    gram_length: Option<usize>,
    max_disjuncts: Option<usize>,
    match_all_token: Option<String>,
    fold_case: Option<bool>,
    nest_limit: Option<u32>,
}

/// Load and merge GramConfig from: defaults <- config file <- env vars <- CLI.
/// The merged result is validated.
pub fn load_config(mut base: GramConfig, opts: MergeOpts) -> Result<GramConfig> {
    if let Some(path) = opts.config_path.as_ref() {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            let file: FileLayer = toml::from_str(&s)?;
            if let Some(v) = file.gram_length {
                base.gram_length = v;
            }
            if let Some(v) = file.max_disjuncts {
                base.max_disjuncts = v;
            }
            if let Some(v) = file.match_all_token {
                base.match_all_token = v;
            }
            if let Some(v) = file.fold_case {
                base.fold_case = v;
            }
            if let Some(v) = file.nest_limit {
                base.nest_limit = v;
            }
        } else {
            tracing::warn!(path = %path.display(), "config file not found; skipping");
        }
    }

    // env vars override file
    if let Some(v) = env_parsed::<usize>(ENV_GRAM_LENGTH) {
        base.gram_length = v;
    }
    if let Some(v) = env_parsed::<usize>(ENV_MAX_DISJUNCTS) {
        base.max_disjuncts = v;
    }
    if let Ok(v) = std::env::var(ENV_MATCH_ALL_TOKEN) {
        base.match_all_token = v;
    }
    if let Ok(v) = std::env::var(ENV_FOLD_CASE) {
        match v.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" => base.fold_case = true,
            "0" | "no" | "false" => base.fold_case = false,
            _ => tracing::warn!(var = ENV_FOLD_CASE, value = %v, "ignoring unparsable env value"),
        }
    }
    if let Some(v) = env_parsed::<u32>(ENV_NEST_LIMIT) {
        base.nest_limit = v;
    }

    // CLI overrides everything
    if let Some(v) = opts.cli_gram_length {
        base.gram_length = v;
    }
    if let Some(v) = opts.cli_max_disjuncts {
        base.max_disjuncts = v;
    }
    if let Some(v) = opts.cli_match_all_token {
        base.match_all_token = v;
    }
    if let Some(v) = opts.cli_fold_case {
        base.fold_case = v;
    }
    if let Some(v) = opts.cli_nest_limit {
        base.nest_limit = v;
    }

    base.validate()?;
    tracing::debug!(config = ?base, "loaded gram query config");
    Ok(base)
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var, value = %raw, "ignoring unparsable env value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    const ALL_VARS: [&str; 5] = [
        ENV_GRAM_LENGTH,
        ENV_MAX_DISJUNCTS,
        ENV_MATCH_ALL_TOKEN,
        ENV_FOLD_CASE,
        ENV_NEST_LIMIT,
    ];

    fn init_test_logging() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        });
    }

    fn clear_env() {
        for v in ALL_VARS {
            std::env::remove_var(v);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_merge_file_env_cli_precedence() {
        init_test_logging();
        tracing::info!("TEST START: config::tests::test_merge_file_env_cli_precedence");
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
gram_length = 4
max_disjuncts = 10
match_all_token = "ALL"
nest_limit = 40
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var(ENV_MAX_DISJUNCTS, "20");
        std::env::set_var(ENV_MATCH_ALL_TOKEN, "EVERYTHING");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            cli_max_disjuncts: Some(30),
            ..MergeOpts::default()
        };

        let got = load_config(GramConfig::default(), opts).expect("load");
        assert_eq!(got.gram_length, 4);
        assert_eq!(got.max_disjuncts, 30);
        assert_eq!(got.match_all_token, "EVERYTHING");
        assert_eq!(got.nest_limit, 40);
        assert!(!got.fold_case);

        clear_env();
        tracing::info!("TEST END: config::tests::test_merge_file_env_cli_precedence");
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults_without_layers() {
        init_test_logging();
        clear_env();
        let got = load_config(GramConfig::default(), MergeOpts::default()).expect("load");
        assert_eq!(got, GramConfig::default());
        assert_eq!(got.gram_length, 3);
        assert_eq!(got.match_all_token, "*:*");
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_file_is_skipped() {
        init_test_logging();
        clear_env();
        let dir = tempfile::tempdir().expect("tempdir");
        let opts = MergeOpts {
            config_path: Some(dir.path().join("absent.toml")),
            cli_fold_case: Some(true),
            ..MergeOpts::default()
        };
        let got = load_config(GramConfig::default(), opts).expect("load");
        assert!(got.fold_case);
        assert_eq!(got.gram_length, 3);
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_env_is_ignored() {
        init_test_logging();
        tracing::info!("TEST START: config::tests::test_invalid_env_is_ignored");
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "gram_length = 2\nfold_case = true\n").unwrap();

        std::env::set_var(ENV_GRAM_LENGTH, "not-a-number");
        std::env::set_var(ENV_FOLD_CASE, "maybe");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_config(GramConfig::default(), opts).expect("load");
        assert_eq!(got.gram_length, 2);
        assert!(got.fold_case);

        clear_env();
        tracing::info!("TEST END: config::tests::test_invalid_env_is_ignored");
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_final_values_rejected() {
        init_test_logging();
        clear_env();
        let opts = MergeOpts {
            cli_gram_length: Some(0),
            ..MergeOpts::default()
        };
        let err = load_config(GramConfig::default(), opts).unwrap_err();
        let err = err.downcast::<GramQueryError>().expect("typed error");
        assert!(matches!(err, GramQueryError::InvalidConfiguration(_)));

        std::env::set_var(ENV_MAX_DISJUNCTS, "0");
        assert!(load_config(GramConfig::default(), MergeOpts::default()).is_err());
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_unknown_file_key_is_an_error() {
        init_test_logging();
        clear_env();
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "gram_lenght = 4\n").unwrap();
        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        assert!(load_config(GramConfig::default(), opts).is_err());
    }

    #[test]
    fn validate_checks_each_field() {
        let mut c = GramConfig::default();
        assert!(c.validate().is_ok());
        c.match_all_token = "  ".into();
        assert!(c.validate().is_err());
        let c = GramConfig {
            max_disjuncts: 0,
            ..GramConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
