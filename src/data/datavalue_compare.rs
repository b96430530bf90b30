use crate::data::datatable::DataValue;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Sort direction for the active column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Text form used for comparison; missing values compare as ""
fn sort_text(value: &DataValue) -> Cow<'_, str> {
    match value {
        DataValue::Null => Cow::Borrowed(""),
        DataValue::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Compare two cell values for column sorting (ascending).
///
/// Missing values are treated as the empty string. When both sides start
/// with a number they compare numerically, otherwise they compare as
/// lowercased text. The empty string never reads as a number, so a blank cell against
/// a number falls back to text comparison.
pub fn compare_for_sort(a: &DataValue, b: &DataValue) -> Ordering {
    let a_text = sort_text(a);
    let b_text = sort_text(b);

    let a_num = numeric_reading(a, &a_text);
    let b_num = numeric_reading(b, &b_text);

    if let (Some(x), Some(y)) = (a_num, b_num) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    collate(&a_text, &b_text)
}

fn numeric_reading(value: &DataValue, text: &str) -> Option<f64> {
    match value {
        DataValue::Integer(i) => Some(*i as f64),
        DataValue::Float(f) if f.is_finite() => Some(*f),
        _ => leading_number(text),
    }
}

/// Read the number at the start of `text`, ignoring whatever follows it.
///
/// Accepts leading whitespace, an optional sign, digits with at most one
/// decimal point and an optional exponent, so "12.5%" reads as 12.5 and
/// "100 shares" as 100. Text without a leading digit is not a number.
pub fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // The exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Case-insensitive text ordering
pub fn collate(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().flat_map(char::to_lowercase);
    let mut right = b.chars().flat_map(char::to_lowercase);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// Stable merge sort over a slice.
///
/// Column values can mix numbers and text, which makes the comparator
/// non-transitive. This sort never panics on such input and keeps ties in
/// their original relative order.
pub fn stable_sort_by<T: Clone, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }

    let mut buffer: Vec<T> = items.to_vec();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            merge(&items[start..mid], &items[mid..end], &mut buffer[start..end], &mut compare);
            start = end;
        }
        items.clone_from_slice(&buffer);
        width *= 2;
    }
}

fn merge<T: Clone, F>(left: &[T], right: &[T], out: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        // Take from the right only when strictly smaller to keep ties stable
        if compare(&right[j], &left[i]) == Ordering::Less {
            out[k] = right[j].clone();
            j += 1;
        } else {
            out[k] = left[i].clone();
            i += 1;
        }
        k += 1;
    }
    while i < left.len() {
        out[k] = left[i].clone();
        i += 1;
        k += 1;
    }
    while j < right.len() {
        out[k] = right[j].clone();
        j += 1;
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> DataValue {
        DataValue::String(v.to_string())
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(
            compare_for_sort(&DataValue::Integer(9), &DataValue::Integer(10)),
            Ordering::Less
        );
        assert_eq!(
            compare_for_sort(&DataValue::Float(2.5), &DataValue::Integer(2)),
            Ordering::Greater
        );
        // Numeric text compares numerically, not lexically
        assert_eq!(compare_for_sort(&s("9"), &s("10")), Ordering::Less);
    }

    #[test]
    fn test_empty_falls_back_to_text() {
        assert_eq!(
            compare_for_sort(&DataValue::Null, &DataValue::Integer(10)),
            Ordering::Less
        );
        assert_eq!(
            compare_for_sort(&DataValue::Integer(-5), &DataValue::Null),
            Ordering::Greater
        );
        assert_eq!(
            compare_for_sort(&DataValue::Null, &s("")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_case_insensitive_text() {
        assert_eq!(compare_for_sort(&s("apple"), &s("Banana")), Ordering::Less);
        assert_eq!(compare_for_sort(&s("APPLE"), &s("apple")), Ordering::Equal);
        assert_eq!(collate("Zeta", "alpha"), Ordering::Greater);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12.5%"), Some(12.5));
        assert_eq!(leading_number("  100 shares"), Some(100.0));
        assert_eq!(leading_number("-3.2e2x"), Some(-320.0));
        assert_eq!(leading_number("7e"), Some(7.0));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("5."), Some(5.0));
        assert_eq!(leading_number("1.2.3"), Some(1.2));
        assert_eq!(leading_number("$12"), None);
        assert_eq!(leading_number("-"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_text_with_leading_number_sorts_numerically() {
        assert_eq!(compare_for_sort(&s("9.1%"), &s("12.5%")), Ordering::Less);
        assert_eq!(compare_for_sort(&s("100 shares"), &s("12.5%")), Ordering::Greater);
        // One side without a leading number falls back to text
        assert_eq!(compare_for_sort(&s("n/a"), &s("12")), Ordering::Greater);
    }

    #[test]
    fn test_direction() {
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
        assert_eq!(
            SortDirection::Descending.apply(Ordering::Less),
            Ordering::Greater
        );
    }

    #[test]
    fn test_stable_sort_keeps_ties() {
        let mut items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        stable_sort_by(&mut items, |x, y| x.0.cmp(&y.0));
        assert_eq!(items, vec![(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_stable_sort_tolerates_mixed_values() {
        // "10" < "1a" as text, "1a" < "9" as text, "9" < "10" numerically
        let mut items = vec![s("10"), s("9"), s("1a"), DataValue::Null, s("2")];
        stable_sort_by(&mut items, compare_for_sort);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], DataValue::Null);
    }
}
