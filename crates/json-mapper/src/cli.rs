//! Logic behind the `json-nodes` and `json-mapping` binaries.
//!
//! - `json-nodes [--prefix P] [--config FILE]`: normalize stdin and list
//!   one row per node.
//! - `json-mapping [--config FILE]`: import an exported mapping document
//!   from stdin and print it re-exported.

use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, MapperConfig};
use crate::export::ImportError;
use crate::normalize::normalize;
use crate::serialize::display_text;
use crate::session::MappingSession;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Import(#[from] ImportError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub config: MapperConfig,
    pub prefix: Option<String>,
}

/// Parses `--config FILE` and `--prefix P` (arguments after the program
/// name).
pub fn parse_args(args: &[String]) -> Result<CliOptions, CliError> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("{flag} requires a value")))
        };
        match arg.as_str() {
            "--config" => options.config = MapperConfig::from_file(value("--config")?)?,
            "--prefix" => options.prefix = Some(value("--prefix")?),
            other => return Err(CliError::Usage(format!("unknown argument `{other}`"))),
        }
    }
    Ok(options)
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "json_mapper=info".into()),
        )
        .init();
}

/// Tab-separated `id  path  type  value` rows for every node of `input`.
pub fn node_rows(input: &str, options: &CliOptions) -> Result<String, CliError> {
    let value: Value = serde_json::from_str(input)?;
    let prefix = options
        .prefix
        .as_deref()
        .unwrap_or(&options.config.source_prefix);
    let model = normalize(&value, prefix, None);
    let mut out = String::new();
    for node in model.iter() {
        let shown = if node.node_type.is_composite() {
            String::new()
        } else {
            display_text(&node.value)
        };
        out.push_str(&format!("{}\t{}\t{}\t{}\n", node.id, node.path, node.node_type, shown));
    }
    Ok(out)
}

/// Imports an exported mapping document and re-exports it, dropping
/// mappings that no longer resolve.
pub fn remap_export(input: &str, options: &CliOptions) -> Result<String, CliError> {
    let mut session = MappingSession::new(options.config.clone());
    session.import_str(input)?;
    Ok(serde_json::to_string_pretty(&session.export())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_prefix() {
        let options = parse_args(&args(&["--prefix", "doc"])).unwrap();
        assert_eq!(options.prefix.as_deref(), Some("doc"));
        assert_eq!(options.config, MapperConfig::default());
    }

    #[test]
    fn rejects_unknown_and_incomplete_args() {
        assert!(matches!(parse_args(&args(&["--bogus"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_args(&args(&["--prefix"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn lists_nodes() {
        let options = CliOptions {
            prefix: Some("doc".into()),
            ..CliOptions::default()
        };
        let out = node_rows(r#"{"a": {"b": true}}"#, &options).unwrap();
        assert_eq!(
            out,
            "doc-node-0\troot.a\tobject\t\ndoc-node-1\troot.a.b\tboolean\ttrue\n"
        );
    }

    #[test]
    fn remap_drops_unresolved_mappings() {
        let input = r#"{
            "mappings": [
                {"source": "a", "target": "b"},
                {"source": "gone", "target": "b"}
            ],
            "source_data_preview": {"a": 1},
            "target_data_preview": {"b": 2},
            "source_field_metadata": {},
            "target_field_metadata": {}
        }"#;
        let out: Value =
            serde_json::from_str(&remap_export(input, &CliOptions::default()).unwrap()).unwrap();
        assert_eq!(out["mappings"], serde_json::json!([{"source": "a", "target": "b"}]));
    }
}
