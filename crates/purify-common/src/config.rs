//! Typed configuration store.
//!
//! Directives are addressed as `Namespace.Directive` and hold JSON values.
//! Every directive has a declared type and default; setting anything else is
//! a setup error. The core only ever reads through the typed getters.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::PurifyError;
use crate::warning::warn_once;

/// Value type a directive accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Int,
    Str,
    /// String or null.
    OptStr,
    /// List of strings. A comma separated string is accepted on input.
    List,
    /// List of strings or null (null means "no restriction").
    OptList,
}

impl Kind {
    const fn describe(self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Int => "an integer",
            Self::Str => "a string",
            Self::OptStr => "a string or null",
            Self::List => "a list of strings",
            Self::OptList => "a list of strings or null",
        }
    }
}

fn list(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::String((*s).to_string())).collect())
}

/// Directive name → (type, default).
static DIRECTIVES: LazyLock<BTreeMap<&'static str, (Kind, Value)>> = LazyLock::new(|| {
    BTreeMap::from([
        ("Core.LexerImpl", (Kind::Str, Value::from("direct"))),
        ("Core.MaintainLineNumbers", (Kind::Bool, Value::Bool(false))),
        ("Core.CollectErrors", (Kind::Bool, Value::Bool(false))),
        ("Core.ConvertDocumentToFragment", (Kind::Bool, Value::Bool(true))),
        ("Core.AggressivelyRemoveScript", (Kind::Bool, Value::Bool(true))),
        ("Core.RemoveProcessingInstructions", (Kind::Bool, Value::Bool(false))),
        ("Core.HiddenElements", (Kind::List, list(&["script", "style"]))),
        ("Core.EscapeInvalidTags", (Kind::Bool, Value::Bool(false))),
        ("Core.NormalizeNewlines", (Kind::Bool, Value::Bool(true))),
        ("HTML.Parent", (Kind::Str, Value::from("div"))),
        ("HTML.Allowed", (Kind::OptStr, Value::Null)),
        ("HTML.ForbiddenElements", (Kind::List, list(&[]))),
        ("HTML.ForbiddenAttributes", (Kind::List, list(&[]))),
        ("HTML.BlockWrapper", (Kind::Str, Value::from("p"))),
        ("HTML.AllowedComments", (Kind::List, list(&[]))),
        ("HTML.DefinitionRev", (Kind::Int, Value::from(1))),
        ("HTML.TidyTransforms", (Kind::Bool, Value::Bool(true))),
        ("HTML.Strict", (Kind::Bool, Value::Bool(false))),
        ("Attr.EnableID", (Kind::Bool, Value::Bool(false))),
        ("Attr.IDPrefix", (Kind::Str, Value::from(""))),
        ("Attr.DefaultImageAlt", (Kind::OptStr, Value::Null)),
        ("Attr.DefaultInvalidImage", (Kind::OptStr, Value::Null)),
        ("Attr.DefaultInvalidImageAlt", (Kind::Str, Value::from("Invalid image"))),
        ("Attr.AllowedFrameTargets", (Kind::List, list(&[]))),
        ("Attr.AllowedRel", (Kind::List, list(&[]))),
        ("Attr.DefinitionRev", (Kind::Int, Value::from(1))),
        ("CSS.AllowImportant", (Kind::Bool, Value::Bool(false))),
        ("CSS.AllowTricky", (Kind::Bool, Value::Bool(false))),
        ("CSS.MaxImgLength", (Kind::OptStr, Value::from("1200px"))),
        ("CSS.AllowedProperties", (Kind::OptList, Value::Null)),
        ("CSS.ForbiddenProperties", (Kind::List, list(&[]))),
        ("CSS.DefinitionRev", (Kind::Int, Value::from(1))),
        (
            "URI.AllowedSchemes",
            (
                Kind::List,
                list(&["http", "https", "mailto", "ftp", "nntp", "news", "tel"]),
            ),
        ),
        ("URI.Disable", (Kind::Bool, Value::Bool(false))),
        ("URI.Host", (Kind::OptStr, Value::Null)),
        ("URI.DisableExternalResources", (Kind::Bool, Value::Bool(false))),
        ("URI.DefinitionRev", (Kind::Int, Value::from(1))),
    ])
});

/// The configuration of one purifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    values: BTreeMap<String, Value>,
    #[serde(skip)]
    finalized: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            values: DIRECTIVES
                .iter()
                .map(|(key, (_, default))| ((*key).to_string(), default.clone()))
                .collect(),
            finalized: false,
        }
    }
}

impl Config {
    /// A configuration holding every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a JSON object.
    ///
    /// Both flat (`{"HTML.Allowed": "p,b"}`) and nested
    /// (`{"HTML": {"Allowed": "p,b"}}`) layouts are accepted.
    ///
    /// # Errors
    /// Returns an error if the document is not a JSON object or names an
    /// unknown or mistyped directive.
    pub fn from_json(source: &str) -> Result<Self, PurifyError> {
        let document: Value =
            serde_json::from_str(source).map_err(|e| PurifyError::ConfigSyntax(e.to_string()))?;
        let Value::Object(root) = document else {
            return Err(PurifyError::ConfigSyntax(
                "expected an object of directives".to_string(),
            ));
        };
        let mut config = Self::default();
        config.load_object(root)?;
        Ok(config)
    }

    fn load_object(&mut self, root: Map<String, Value>) -> Result<(), PurifyError> {
        for (key, value) in root {
            match value {
                Value::Object(inner) if !key.contains('.') => {
                    for (directive, value) in inner {
                        self.set(&format!("{key}.{directive}"), value)?;
                    }
                }
                value => self.set(&key, value)?,
            }
        }
        Ok(())
    }

    /// Set one directive.
    ///
    /// # Errors
    /// Fails on an unknown directive, a value of the wrong type, or a
    /// finalized configuration.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), PurifyError> {
        if self.finalized {
            return Err(PurifyError::ConfigFinalized(key.to_string()));
        }
        let (kind, _) = DIRECTIVES
            .get(key)
            .ok_or_else(|| PurifyError::UnknownDirective(key.to_string()))?;
        let value = coerce(*kind, value.into()).ok_or(PurifyError::DirectiveType {
            key: key.to_string(),
            expected: kind.describe(),
        })?;
        let _ = self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Freeze the configuration. Later `set` calls fail.
    pub const fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Whether `finalize` was called.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn raw(&self, key: &str) -> Option<&Value> {
        let value = self.values.get(key);
        if value.is_none() {
            warn_once("Config", &format!("read of undeclared directive '{key}'"));
        }
        value
    }

    /// Boolean directive (false when undeclared).
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.raw(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Integer directive (0 when undeclared).
    #[must_use]
    pub fn get_int(&self, key: &str) -> i64 {
        self.raw(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// String directive. `None` for null-valued directives.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.raw(key).and_then(Value::as_str)
    }

    /// List directive. `None` for null-valued directives.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.raw(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
    }

    /// List directive as a lookup set (empty for null-valued directives).
    #[must_use]
    pub fn get_set(&self, key: &str) -> HashSet<String> {
        self.get_list(key).unwrap_or_default().into_iter().collect()
    }

    /// Stable digest of every directive in `namespace`, suffixed with its
    /// `DefinitionRev`. Two configurations share cached definitions for the
    /// namespace exactly when their fingerprints match.
    #[must_use]
    pub fn fingerprint(&self, namespace: &str) -> String {
        fingerprint_of(self, &[namespace])
    }

    /// Fingerprint over several namespaces at once.
    #[must_use]
    pub fn fingerprint_all(&self, namespaces: &[&str]) -> String {
        fingerprint_of(self, namespaces)
    }
}

fn fingerprint_of(config: &Config, namespaces: &[&str]) -> String {
    let prefixes: BTreeSet<String> = namespaces.iter().map(|ns| format!("{ns}.")).collect();
    let relevant: BTreeMap<&str, &Value> = config
        .values
        .iter()
        .filter(|(key, _)| prefixes.iter().any(|p| key.starts_with(p.as_str())))
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    // BTreeMap serializes in key order, which keeps the digest stable.
    let canonical = serde_json::to_string(&relevant).unwrap_or_default();
    let digest = Sha256::digest(canonical.as_bytes());
    let revisions: Vec<String> = namespaces
        .iter()
        .map(|ns| config.get_int(&format!("{ns}.DefinitionRev")).to_string())
        .collect();
    format!("{digest:x}-{}", revisions.join("."))
}

fn coerce(kind: Kind, value: Value) -> Option<Value> {
    match (kind, value) {
        (Kind::Bool, v @ Value::Bool(_)) | (Kind::Str | Kind::OptStr, v @ Value::String(_)) => {
            Some(v)
        }
        (Kind::Int, v @ Value::Number(_)) if v.is_i64() => Some(v),
        (Kind::OptStr | Kind::OptList, Value::Null) => Some(Value::Null),
        (Kind::List | Kind::OptList, Value::String(s)) => Some(list(
            &s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>(),
        )),
        (Kind::List | Kind::OptList, Value::Array(items)) => {
            if items.iter().all(Value::is_string) {
                Some(Value::Array(items))
            } else {
                None
            }
        }
        _ => None,
    }
}
