//! Per-institution bill templates and the registry they are looked up from.
//!
//! Config shape (JSON):
//! ```json
//! {"bill_templates": {"bancolombia_v1": {
//!     "headers": ["Fecha de Transacción", "Descripción", ...],
//!     "fields_to_extract": ["Fecha de Transacción", ...],
//!     "normalizers": {"Fecha de Transacción": "date", "Valor Original": "amount"},
//!     "currency_split": {"foreign": {"Saldo a Diferir": "!=0"}, "domestic": {"Saldo a Diferir": "0"}},
//!     "exclude_descriptions": ["PAGO SUCURSAL VIRTUAL"]
//! }}}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ExtractError, Result};

/// Templates compiled into the binary.
const BUILTIN_TEMPLATES: &str = include_str!("../config/bill_templates.json");

/// Column condition used by currency rules. Written `"0"` / `"!=0"` in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    EqualsZero,
    NotEqualsZero,
}

impl Condition {
    pub fn holds(&self, value: f64) -> bool {
        match self {
            Condition::EqualsZero => value == 0.0,
            Condition::NotEqualsZero => value != 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::EqualsZero => "0",
            Condition::NotEqualsZero => "!=0",
        }
    }
}

impl TryFrom<String> for Condition {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        match s.trim() {
            "0" | "==0" => Ok(Condition::EqualsZero),
            "!=0" => Ok(Condition::NotEqualsZero),
            other => Err(format!("unsupported condition {other:?} (expected \"0\" or \"!=0\")")),
        }
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.as_str().to_string()
    }
}

impl Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Condition::try_from(s).map_err(serde::de::Error::custom)
    }
}

/// Column name -> condition; all must hold for the set to match.
pub type RuleSet = BTreeMap<String, Condition>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencySplit {
    #[serde(default)]
    pub foreign: RuleSet,
    #[serde(default)]
    pub domestic: RuleSet,
}

/// How a projected field's raw cell text is normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    Date,
    Amount,
    #[default]
    Text,
}

fn default_description_field() -> String {
    "Descripción".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Filled from the registry key.
    #[serde(skip)]
    pub name: String,
    /// Required header cells (case-insensitive, any order).
    pub headers: Vec<String>,
    pub fields_to_extract: Vec<String>,
    /// Column holding the line description, used for exclusion.
    #[serde(default = "default_description_field")]
    pub description_field: String,
    /// Fields not listed here pass through as text.
    #[serde(default)]
    pub normalizers: BTreeMap<String, NormalizerKind>,
    #[serde(default)]
    pub currency_split: CurrencySplit,
    #[serde(default)]
    pub exclude_descriptions: Vec<String>,
}

impl Template {
    pub fn normalizer(&self, field: &str) -> NormalizerKind {
        self.normalizers.get(field).copied().unwrap_or_default()
    }

    /// Case-insensitive membership in `exclude_descriptions`.
    pub fn is_excluded(&self, description: &str) -> bool {
        let d = description.trim().to_uppercase();
        self.exclude_descriptions
            .iter()
            .any(|e| e.trim().to_uppercase() == d)
    }
}

/// Lookup capability the mapper is constructed with.
pub trait TemplateSource {
    fn template(&self, name: &str) -> Result<&Template>;
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    bill_templates: BTreeMap<String, Template>,
}

/// An in-memory set of named templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates bundled in `config/bill_templates.json`.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TEMPLATES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: TemplateFile = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (name, mut template) in file.bill_templates {
            template.name = name;
            registry.insert(template)?;
        }
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_json(&s)
    }

    /// Add a template, rejecting ones that cannot produce records.
    pub fn insert(&mut self, template: Template) -> Result<()> {
        if template.name.trim().is_empty() {
            return Err(ExtractError::Config("template without a name".to_string()));
        }
        if template.headers.is_empty() {
            return Err(ExtractError::Config(format!(
                "template {} has no headers",
                template.name
            )));
        }
        if template.fields_to_extract.is_empty() {
            return Err(ExtractError::Config(format!(
                "template {} has no fields_to_extract",
                template.name
            )));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for TemplateRegistry {
    fn template(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| ExtractError::UnknownTemplate(name.to_string()))
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn template(&self, name: &str) -> Result<&Template> {
        (**self).template(name)
    }
}
