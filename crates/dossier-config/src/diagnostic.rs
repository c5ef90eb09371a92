// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup diagnostics for `dossier.toml`.
//!
//! Figment errors and validation failures are both turned into
//! [`ConfigError`]s and printed with miette before the process exits.

#![allow(unused_assignments)] // emitted by miette's Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key needs before it is offered as a fix.
const CLOSE_ENOUGH: f64 = 0.8;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a dossier setting")]
    #[diagnostic(
        code(dossier::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), allowed))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        allowed: String,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(dossier::config::invalid_type), help("{}", env_hint(key)))]
    InvalidType { key: String, detail: String },

    #[error("`{key}` must be set")]
    #[diagnostic(code(dossier::config::missing_key), help("{}", env_hint(key)))]
    MissingKey { key: String },

    /// A value that parsed but makes no sense, reported by `validate_config`.
    #[error("{message}")]
    #[diagnostic(code(dossier::config::validation))]
    Validation { message: String },

    #[error("cannot load configuration: {0}")]
    #[diagnostic(code(dossier::config::load))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, allowed: &str) -> String {
    match suggestion {
        Some(close) => format!("did you mean `{close}`? this section accepts: {allowed}"),
        None => format!("this section accepts: {allowed}"),
    }
}

/// Point at both the file key and its `DOSSIER_` environment override.
fn env_hint(key: &str) -> String {
    let var = key.replace('.', "_").to_uppercase();
    format!("set `{key}` in dossier.toml or DOSSIER_{var} in the environment")
}

/// Translate every error carried by `err` into a [`ConfigError`].
///
/// `sources` pairs each config file path with its content so unknown keys
/// can be underlined.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let path = error.path.clone();
            match &error.kind {
                Kind::UnknownField(key, allowed) => {
                    let (span, src) = underline(&error, &path, key, sources).unzip();
                    ConfigError::UnknownKey {
                        key: key.clone(),
                        suggestion: suggest_key(key, allowed),
                        allowed: allowed.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(key) => ConfigError::MissingKey {
                    key: dotted(&path, key),
                },
                Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {found}, expected {expected}"),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{key}", path.join("."))
    }
}

fn underline(
    error: &figment::Error,
    path: &[String],
    key: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let file = match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(file) => file.display().to_string(),
        _ => return None,
    };
    let (name, content) = sources.iter().find(|(name, _)| *name == file)?;
    let offset = find_key_offset(content, path, key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `key` inside the `[path[0]]` table of `content`.
///
/// The search stops at the next table header so a key of the same name in a
/// later section is never picked.
pub fn find_key_offset(content: &str, path: &[String], key: &str) -> Option<usize> {
    let mut in_section = path.is_empty();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            if in_section && !path.is_empty() {
                return None;
            }
            in_section = path.first().is_some_and(|s| trimmed.starts_with(&format!("[{s}]")));
        } else if in_section {
            let rest = trimmed.strip_prefix(key).map(str::trim_start);
            if rest.is_some_and(|r| r.starts_with('=')) {
                return Some(offset + line.len() - trimmed.len());
            }
        }
        offset += line.len();
    }
    None
}

/// Closest entry of `allowed` to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, allowed: &[&str]) -> Option<String> {
    allowed
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score >= CLOSE_ENOUGH)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Print `errors` to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
}
