//! Output formats for parsed scripts
//!
//! Every format renders the same normalized [`AstSnapshot`], so traversal lives in one
//! place ([snapshot]) and the formats only decide presentation:
//!
//! - `treeviz`: one line per node with an icon, for eyeballing trees in tests
//! - `json` / `yaml`: the snapshot through serde
//! - `describe`: the surface syntax itself, see [`Describe`]

pub mod snapshot;
pub mod treeviz;

pub use snapshot::{snapshot_script, AstSnapshot};
pub use treeviz::to_treeviz_str;

use crate::script::ast::{Describe, ScriptNode};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Treeviz,
    Json,
    Yaml,
    Describe,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Treeviz, Format::Json, Format::Yaml, Format::Describe];

    pub fn name(self) -> &'static str {
        match self {
            Format::Treeviz => "treeviz",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Describe => "describe",
        }
    }

    pub fn render(self, script: &ScriptNode) -> Result<String, FormatError> {
        match self {
            Format::Treeviz => Ok(to_treeviz_str(script)),
            Format::Json => to_json(script),
            Format::Yaml => to_yaml(script),
            Format::Describe => Ok(script.describe_to_string()),
        }
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.name() == name)
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))
    }
}

pub fn to_json(script: &ScriptNode) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&snapshot_script(script))?)
}

pub fn to_yaml(script: &ScriptNode) -> Result<String, FormatError> {
    Ok(serde_yaml::to_string(&snapshot_script(script))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_script;

    #[test]
    fn test_format_by_name() {
        assert_eq!("yaml".parse::<Format>().unwrap(), Format::Yaml);
        assert!(matches!(
            "xml".parse::<Format>(),
            Err(FormatError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn test_json_nests_children() {
        let script = parse_script("connect tcp://localhost:8080\nconnected\nwrite \"hi\"\n").unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&script).unwrap()).unwrap();

        assert_eq!(json["node_type"], "script");
        assert_eq!(json["children"][0]["node_type"], "connect");
        assert_eq!(json["children"][0]["children"][1]["node_type"], "write");
        assert_eq!(json["children"][0]["children"][1]["children"][0]["label"], "\"hi\"");
    }

    #[test]
    fn test_yaml_has_same_shape() {
        let script = parse_script("connect tcp://localhost:8080\nconnected\n").unwrap();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&to_yaml(&script).unwrap()).unwrap();
        assert_eq!(yaml["children"][0]["label"].as_str(), Some("tcp://localhost:8080"));
    }

    #[test]
    fn test_describe_format_is_surface_syntax() {
        let source = "connect tcp://localhost:8080\nconnected\nclose\nclosed\n";
        let script = parse_script(source).unwrap();
        assert_eq!(Format::Describe.render(&script).unwrap(), source);
    }
}
