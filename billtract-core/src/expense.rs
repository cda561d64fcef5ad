//! Normalized expense records and the per-currency result buckets.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A normalized field value.
///
/// Dates are carried as `Text` holding `YYYY-MM-DD` (or the verbatim input
/// when no known format matched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Amount(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Amount(_) => None,
        }
    }

    pub fn as_amount(&self) -> Option<f64> {
        match self {
            FieldValue::Amount(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Loose equality used when checking against ground truth: text is
    /// compared trimmed, amounts within 1e-9.
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Amount(a), FieldValue::Amount(b)) => (a - b).abs() < 1e-9,
            (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
            _ => self.to_string().trim() == other.to_string().trim(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Amount(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Amount(v)
    }
}

/// One template-projected transaction line. Field order follows the
/// template's `fields_to_extract`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ExpenseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value for the same name in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ExpenseRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = ExpenseRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field name to string or number")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = ExpenseRecord::new();
        while let Some((k, v)) = access.next_entry::<String, FieldValue>()? {
            record.insert(k, v);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for ExpenseRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Currency bucket a table's lines are assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Foreign,
    Domestic,
}

impl Currency {
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Foreign => "foreign",
            Currency::Domestic => "domestic",
        }
    }
}

/// The two ordered output collections of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedExpenses {
    #[serde(default, alias = "usd_expenses")]
    pub foreign_expenses: Vec<ExpenseRecord>,
    #[serde(default, alias = "cop_expenses")]
    pub domestic_expenses: Vec<ExpenseRecord>,
}

impl ExtractedExpenses {
    pub fn bucket(&self, currency: Currency) -> &[ExpenseRecord] {
        match currency {
            Currency::Foreign => &self.foreign_expenses,
            Currency::Domestic => &self.domestic_expenses,
        }
    }

    pub fn push(&mut self, currency: Currency, record: ExpenseRecord) {
        match currency {
            Currency::Foreign => self.foreign_expenses.push(record),
            Currency::Domestic => self.domestic_expenses.push(record),
        }
    }

    pub fn total_records(&self) -> usize {
        self.foreign_expenses.len() + self.domestic_expenses.len()
    }
}
