//! billtract-expenses: bill templates, field normalizers, currency classification, and ground-truth validation

pub mod classify;
pub mod error;
pub mod mapper;
pub mod normalize;
pub mod template;
pub mod validation;

pub use error::{ExtractError, Result};
pub use mapper::{ExpenseMapper, extract_expenses};
pub use normalize::{parse_amount, parse_date};
pub use template::{
    Condition, CurrencySplit, NormalizerKind, RuleSet, Template, TemplateRegistry, TemplateSource,
};
pub use validation::{BucketReport, ValidationReport, compare_records, validate};
