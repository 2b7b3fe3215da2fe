//! Cell comparators
//!
//! Every cell is turned into a [`SortKey`] once, then keys are compared. Keys
//! that fail to parse become [`SortKey::Invalid`], which sorts after every
//! valid key, so each comparator is a total order.

use super::ColumnKind;
use std::cmp::Ordering;

/// Tokens that mean "no percentage available"
pub const NOT_APPLICABLE_TOKENS: &[&str] = &["N/A", "Not applicable"];

/// Stand-in value for [`NOT_APPLICABLE_TOKENS`]
pub const NOT_APPLICABLE_RANK: f64 = -1.0;

/// Stand-in value for an empty percentage cell
pub const EMPTY_PERCENTAGE_RANK: f64 = 100.0;

/// Comparable form of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(i64),
    /// Uppercased text
    Text(String),
    Percent(f64),
    /// Cell text that could not be parsed for its column kind
    Invalid,
}

impl SortKey {
    /// Interpret raw cell text according to the column kind
    pub fn extract(kind: ColumnKind, raw: &str) -> Self {
        match kind {
            ColumnKind::Numeric => parse_leading_int(raw).map_or(SortKey::Invalid, SortKey::Number),
            ColumnKind::Text => SortKey::Text(raw.to_uppercase()),
            ColumnKind::Percentage => {
                parse_percentage(raw).map_or(SortKey::Invalid, SortKey::Percent)
            }
        }
    }

    /// String form embedded in rendered pages (`data-key`); empty for invalid keys
    pub fn to_attr(&self) -> String {
        match self {
            SortKey::Number(n) => n.to_string(),
            SortKey::Text(s) => s.clone(),
            SortKey::Percent(p) => p.to_string(),
            SortKey::Invalid => String::new(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Percent(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Invalid => 3,
        }
    }
}

/// Ascending comparison of two keys
pub fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.cmp(y),
        (SortKey::Percent(x), SortKey::Percent(y)) => x.total_cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Compare two raw cells of the given kind in the given direction
#[cfg(test)]
fn compare_cells(
    kind: ColumnKind,
    a: &str,
    b: &str,
    direction: super::SortDirection,
) -> Ordering {
    direction.apply(compare_keys(
        &SortKey::extract(kind, a),
        &SortKey::extract(kind, b),
    ))
}

/// Leading-integer parse: optional sign, then digits; anything after is ignored
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn parse_percentage(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if NOT_APPLICABLE_TOKENS.contains(&s) {
        return Some(NOT_APPLICABLE_RANK);
    }
    if s.is_empty() {
        return Some(EMPTY_PERCENTAGE_RANK);
    }
    // Strip one trailing unit character ("%", "‰", ...)
    let number = match s.chars().next_back() {
        Some(c) if !c.is_ascii_digit() && c != '.' => &s[..s.len() - c.len_utf8()],
        _ => s,
    };
    number
        .trim_end()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        // "-0%" and "0%" are the same key
        .map(|v| if v == 0.0 { 0.0 } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SortDirection;

    fn pct(raw: &str) -> SortKey {
        SortKey::extract(ColumnKind::Percentage, raw)
    }

    #[test]
    fn test_percentage_parses_suffixed_value() {
        assert_eq!(pct("45%"), SortKey::Percent(45.0));
        assert_eq!(pct("83.333%"), SortKey::Percent(83.333));
        assert_eq!(pct(" 7.5% "), SortKey::Percent(7.5));
        assert_eq!(pct("12"), SortKey::Percent(12.0));
    }

    #[test]
    fn test_percentage_sentinels() {
        assert_eq!(pct("N/A"), SortKey::Percent(NOT_APPLICABLE_RANK));
        assert_eq!(pct("Not applicable"), SortKey::Percent(NOT_APPLICABLE_RANK));
        assert_eq!(pct(""), SortKey::Percent(EMPTY_PERCENTAGE_RANK));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(
            compare_cells(ColumnKind::Percentage, "-0%", "0%", SortDirection::Ascending),
            Ordering::Equal
        );
        assert_eq!(pct("-0%").to_attr(), "0");
        assert_eq!(pct("-0.000%").to_attr(), "0");
    }

    #[test]
    fn test_text_orders_by_code_point() {
        // U+FF21 (fullwidth A) sorts before U+1F600 even though its UTF-16 unit is larger
        assert_eq!(
            compare_cells(ColumnKind::Text, "\u{FF21}", "\u{1F600}", SortDirection::Ascending),
            Ordering::Less
        );
    }

    #[test]
    fn test_percentage_garbage_is_invalid() {
        assert_eq!(pct("abc%"), SortKey::Invalid);
        assert_eq!(pct("NaN%"), SortKey::Invalid);
        assert_eq!(pct("n/a"), SortKey::Invalid);
    }

    #[test]
    fn test_not_applicable_sorts_first_and_empty_last() {
        for value in ["0%", "0.001%", "45%", "99.999%"] {
            assert_eq!(
                compare_cells(ColumnKind::Percentage, "N/A", value, SortDirection::Ascending),
                Ordering::Less,
                "N/A vs {}",
                value
            );
            assert_eq!(
                compare_cells(ColumnKind::Percentage, "", value, SortDirection::Ascending),
                Ordering::Greater,
                "empty vs {}",
                value
            );
        }
        // Both sentinels map the same way regardless of operand side
        assert_eq!(
            compare_cells(ColumnKind::Percentage, "N/A", "Not applicable", SortDirection::Ascending),
            Ordering::Equal
        );
    }

    #[test]
    fn test_numeric_leading_integer() {
        assert_eq!(SortKey::extract(ColumnKind::Numeric, "42"), SortKey::Number(42));
        assert_eq!(SortKey::extract(ColumnKind::Numeric, " -7"), SortKey::Number(-7));
        assert_eq!(SortKey::extract(ColumnKind::Numeric, "12 commands"), SortKey::Number(12));
        assert_eq!(SortKey::extract(ColumnKind::Numeric, "x12"), SortKey::Invalid);
        assert_eq!(SortKey::extract(ColumnKind::Numeric, ""), SortKey::Invalid);
    }

    #[test]
    fn test_numeric_compares_by_value_not_text() {
        assert_eq!(
            compare_cells(ColumnKind::Numeric, "9", "10", SortDirection::Ascending),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(ColumnKind::Numeric, "9", "10", SortDirection::Descending),
            Ordering::Greater
        );
    }

    #[test]
    fn test_text_ignores_case_and_reports_equal() {
        assert_eq!(
            compare_cells(ColumnKind::Text, "Network", "network", SortDirection::Ascending),
            Ordering::Equal
        );
        assert_eq!(
            compare_cells(ColumnKind::Text, "acr", "Batch", SortDirection::Ascending),
            Ordering::Less
        );
    }

    #[test]
    fn test_invalid_sorts_after_valid() {
        assert_eq!(
            compare_cells(ColumnKind::Numeric, "oops", "1000", SortDirection::Ascending),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells(ColumnKind::Numeric, "oops", "huh", SortDirection::Ascending),
            Ordering::Equal
        );
    }

    #[test]
    fn test_to_attr() {
        assert_eq!(pct("45%").to_attr(), "45");
        assert_eq!(pct("N/A").to_attr(), "-1");
        assert_eq!(SortKey::Invalid.to_attr(), "");
        assert_eq!(SortKey::extract(ColumnKind::Text, "vm").to_attr(), "VM");
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::table::SortDirection;
    use proptest::prelude::*;

    fn percentage_cell() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("N/A".to_string()),
            Just("Not applicable".to_string()),
            Just(String::new()),
            (0u32..100_000).prop_map(|v| format!("{:.3}%", v as f64 / 1000.0)),
            "[a-z%]{0,4}",
        ]
    }

    fn kind() -> impl Strategy<Value = ColumnKind> {
        prop::sample::select(vec![
            ColumnKind::Numeric,
            ColumnKind::Text,
            ColumnKind::Percentage,
        ])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn ascending_is_antisymmetric(k in kind(), a in ".{0,12}", b in ".{0,12}") {
            let ab = compare_cells(k, &a, &b, SortDirection::Ascending);
            let ba = compare_cells(k, &b, &a, SortDirection::Ascending);
            prop_assert_eq!(ab, ba.reverse());
        }

        #[test]
        fn equal_cells_compare_equal(k in kind(), a in ".{0,12}") {
            prop_assert_eq!(compare_cells(k, &a, &a, SortDirection::Ascending), Ordering::Equal);
            prop_assert_eq!(compare_cells(k, &a, &a, SortDirection::Descending), Ordering::Equal);
        }

        #[test]
        fn descending_reverses_ascending(a in percentage_cell(), b in percentage_cell()) {
            let asc = compare_cells(ColumnKind::Percentage, &a, &b, SortDirection::Ascending);
            let desc = compare_cells(ColumnKind::Percentage, &a, &b, SortDirection::Descending);
            prop_assert_eq!(asc, desc.reverse());
        }

        #[test]
        fn numeric_matches_integer_order(a in -10_000i64..10_000, b in -10_000i64..10_000) {
            let ord = compare_cells(
                ColumnKind::Numeric,
                &a.to_string(),
                &b.to_string(),
                SortDirection::Ascending,
            );
            prop_assert_eq!(ord, a.cmp(&b));
        }
    }
}
