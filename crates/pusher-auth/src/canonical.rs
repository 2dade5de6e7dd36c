//! Canonical query string construction.
//!
//! The signature is computed over the exact bytes of the canonical query
//! string, so client and server must agree on it byte-for-byte:
//!
//! ```text
//! name1=value1&name2=value2&...
//! ```
//!
//! Parameters are sorted by name using byte-wise lexicographic comparison.
//! Values are interpolated verbatim; the remote verifier signs unescaped
//! values. Percent-encoding is applied only when the query is written onto
//! the wire (see [`encode_query_component`]).

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters that are percent-encoded when a query component is placed in a URL.
///
/// Everything except RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`).
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A scalar parameter value: a string or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A string value.
    Text(String),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number, rendered the way JavaScript's
    /// `Number.prototype.toString` renders it (`1e+21`, `Infinity`, `0`
    /// for negative zero).
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float(n) => write_js_number(f, *n),
        }
    }
}

/// Shortest round-trip digits, positional for exponents in `[-7, 21)` and
/// exponential otherwise.
fn write_js_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("NaN");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if value < 0.0 {
        f.write_str("-")?;
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exp: i64 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    let n = exp + 1;
    let zeros = |count: i64| "0".repeat(usize::try_from(count).unwrap_or(0));

    if (k..=21).contains(&n) {
        write!(f, "{digits}{}", zeros(n - k))
    } else if (1..=21).contains(&n) {
        let (int, frac) = digits.split_at(usize::try_from(n).unwrap_or(0));
        write!(f, "{int}.{frac}")
    } else if (-5..=0).contains(&n) {
        write!(f, "0.{}{digits}", zeros(-n))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        match digits.split_at(1) {
            (first, "") => write!(f, "{first}e{sign}{}", exp.abs()),
            (first, rest) => write!(f, "{first}.{rest}e{sign}{}", exp.abs()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A mapping from unique parameter names to scalar values.
///
/// Insertion order is irrelevant; the canonical encoder imposes the only
/// order that matters.
///
/// # Examples
///
/// ```
/// use pusher_auth::canonical::{ParameterMap, build_canonical_query_string};
///
/// let params = ParameterMap::new()
///     .with("info", "user_count")
///     .with("filter_by_prefix", "presence-");
/// assert_eq!(
///     build_canonical_query_string(&params),
///     "filter_by_prefix=presence-&info=user_count"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    entries: HashMap<String, ParamValue>,
}

impl ParameterMap {
    /// Create an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value for that name if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    /// Whether a parameter with the given name is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the parameters in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterMap
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Render the parameters as `(name, value)` pairs sorted by name.
///
/// Names are compared byte-wise, so `"B" < "a" < "a_b" < "aa"` and
/// `"10" < "9"`.
#[must_use]
pub fn canonical_pairs(params: &ParameterMap) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_owned(), v.to_string()))
        .collect();

    pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Build the canonical query string: sorted `name=value` pairs joined by `&`.
///
/// # Examples
///
/// ```
/// use pusher_auth::canonical::{ParameterMap, build_canonical_query_string};
///
/// assert_eq!(build_canonical_query_string(&ParameterMap::new()), "");
/// let params: ParameterMap = [("b", 2), ("a", 1)].into_iter().collect();
/// assert_eq!(build_canonical_query_string(&params), "a=1&b=2");
/// ```
#[must_use]
pub fn build_canonical_query_string(params: &ParameterMap) -> String {
    join_pairs(&canonical_pairs(params))
}

/// Join already-ordered pairs into `name=value&...` without escaping.
#[must_use]
pub fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a query name or value for transmission.
#[must_use]
pub fn encode_query_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}

/// Decode a percent-encoded query component received on the wire.
#[must_use]
pub fn decode_query_component(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_sort_query_parameters() {
        let params: ParameterMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        assert_eq!(build_canonical_query_string(&params), "a=1&b=2&c=3");
    }

    #[test]
    fn test_should_return_empty_for_empty_map() {
        assert_eq!(build_canonical_query_string(&ParameterMap::new()), "");
    }

    #[test]
    fn test_should_sort_bytewise_not_numerically_or_by_locale() {
        let params: ParameterMap = [("b", 1), ("aa", 2), ("a_b", 3), ("B", 4), ("a", 5)]
            .into_iter()
            .collect();
        assert_eq!(
            build_canonical_query_string(&params),
            "B=4&a=5&a_b=3&aa=2&b=1"
        );

        let numeric: ParameterMap = [("9", "x"), ("10", "y")].into_iter().collect();
        assert_eq!(build_canonical_query_string(&numeric), "10=y&9=x");
    }

    #[test]
    fn test_should_not_depend_on_insertion_order() {
        let mut forward = ParameterMap::new();
        let mut backward = ParameterMap::new();
        let names = ["auth_version", "auth_key", "info", "body_md5", "auth_timestamp"];

        for name in names {
            forward.insert(name, name);
        }
        for name in names.iter().rev() {
            backward.insert(*name, *name);
        }

        assert_eq!(
            build_canonical_query_string(&forward),
            build_canonical_query_string(&backward)
        );
    }

    #[test]
    fn test_should_render_numbers_and_strings() {
        let params = ParameterMap::new()
            .with("count", 3_u32)
            .with("offset", -1_i32)
            .with("ratio", 0.5)
            .with("name", "x");
        assert_eq!(
            build_canonical_query_string(&params),
            "count=3&name=x&offset=-1&ratio=0.5"
        );
    }

    #[test]
    fn test_should_render_floats_like_javascript() {
        let cases = [
            (0.5, "0.5"),
            (3.0, "3"),
            (123.456, "123.456"),
            (-2.25, "-2.25"),
            (-0.0, "0"),
            (0.000_001, "0.000001"),
            (1.5e-7, "1.5e-7"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (1.25e22, "1.25e+22"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
            (f64::NAN, "NaN"),
        ];
        for (value, expected) in cases {
            assert_eq!(ParamValue::Float(value).to_string(), expected, "{value:?}");
        }
    }

    #[test]
    fn test_should_preserve_raw_values_in_canonical_form() {
        let params = ParameterMap::new().with("filter_by_prefix", "presence-a b");
        assert_eq!(
            build_canonical_query_string(&params),
            "filter_by_prefix=presence-a b"
        );
    }

    #[test]
    fn test_should_replace_value_on_duplicate_insert() {
        let mut params = ParameterMap::new();
        assert!(params.insert("a", 1).is_none());
        assert_eq!(params.insert("a", 2), Some(ParamValue::Int(1)));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_should_encode_and_decode_query_components() {
        assert_eq!(encode_query_component("presence-a b"), "presence-a%20b");
        assert_eq!(encode_query_component("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_query_component("x:y/z"), "x%3Ay%2Fz");
        assert_eq!(decode_query_component("presence-a%20b"), "presence-a b");
    }
}
