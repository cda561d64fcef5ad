//! Field normalizers. None of these fail: unparseable input degrades to a
//! safe value (`0.0` for amounts, the trimmed original for dates).

use billtract_core::FieldValue;
use chrono::NaiveDate;

use crate::template::NormalizerKind;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [DateFormat; 4] = [
    DateFormat {
        pattern: "%d/%m/%Y",
        sep: '/',
        year_first: false,
        year_digits: 4,
    },
    DateFormat {
        pattern: "%d-%m-%Y",
        sep: '-',
        year_first: false,
        year_digits: 4,
    },
    DateFormat {
        pattern: "%Y-%m-%d",
        sep: '-',
        year_first: true,
        year_digits: 4,
    },
    DateFormat {
        pattern: "%d/%m/%y",
        sep: '/',
        year_first: false,
        year_digits: 2,
    },
];

struct DateFormat {
    pattern: &'static str,
    sep: char,
    year_first: bool,
    year_digits: usize,
}

impl DateFormat {
    /// chrono accepts short years for `%Y`; the layout check keeps
    /// "21/04/25" from parsing as year 25.
    fn parse(&self, s: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = s.split(self.sep).collect();
        let numeric = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        if parts.len() != 3 || !parts.iter().all(numeric) {
            return None;
        }
        let (year, others) = if self.year_first {
            (parts[0], [parts[1], parts[2]])
        } else {
            (parts[2], [parts[0], parts[1]])
        };
        if year.len() != self.year_digits || others.iter().any(|p| p.len() > 2) {
            return None;
        }
        NaiveDate::parse_from_str(s, self.pattern).ok()
    }
}

/// Normalize a date to `YYYY-MM-DD`; unknown layouts come back trimmed, unchanged.
pub fn parse_date(value: &str) -> String {
    let v = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| f.parse(v))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| v.to_string())
}

/// Parse a money string, keeping its sign. Anything that is not a digit,
/// comma, period or minus is dropped, then commas are treated as thousands
/// separators.
pub fn parse_amount(value: &str) -> f64 {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .filter(|c| *c != ',')
        .collect();
    if clean.is_empty() {
        return 0.0;
    }
    clean.parse().unwrap_or(0.0)
}

pub fn normalize(kind: NormalizerKind, raw: &str) -> FieldValue {
    match kind {
        NormalizerKind::Date => FieldValue::Text(parse_date(raw)),
        NormalizerKind::Amount => FieldValue::Amount(parse_amount(raw)),
        NormalizerKind::Text => FieldValue::Text(raw.trim().to_string()),
    }
}
