//! Cache Key Module
//!
//! Builds canonical storage keys from a namespace and a parameter set.

use std::collections::BTreeMap;
use std::fmt;

// == Param Value ==
/// Scalar value allowed in a cache key parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

// == Params ==
/// Parameter set disambiguating entries within a namespace.
///
/// Backed by a `BTreeMap`, so iteration is always in sorted key order no
/// matter how the set was built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// == Canonical Key ==
const ESCAPE: char = '\\';
const NAMESPACE_SEPARATOR: char = '_';
const PAIR_SEPARATOR: char = '|';
const VALUE_SEPARATOR: char = ':';

/// Characters escaped inside a namespace. `_` stays literal so the last
/// unescaped `_` ahead of the first unescaped `:` marks where params begin.
const NAMESPACE_SPECIALS: &[char] = &[VALUE_SEPARATOR, PAIR_SEPARATOR];
const PARAM_KEY_SPECIALS: &[char] = &[NAMESPACE_SEPARATOR, VALUE_SEPARATOR, PAIR_SEPARATOR];
const PARAM_VALUE_SPECIALS: &[char] = &[VALUE_SEPARATOR, PAIR_SEPARATOR];

/// Derives the backing-store key for a namespace and optional params.
///
/// `cars_list` with `{page: 2, country: "US"}` becomes
/// `cars_list_country:US|page:2`. A missing or empty parameter set yields
/// the bare namespace. Separator characters inside the namespace, param
/// names and values are backslash-escaped, so distinct inputs never share
/// a key.
pub fn canonical_key(namespace: &str, params: Option<&Params>) -> String {
    let mut key = String::with_capacity(namespace.len());
    escape_into(&mut key, namespace, NAMESPACE_SPECIALS);

    if let Some(params) = params.filter(|p| !p.is_empty()) {
        key.push(NAMESPACE_SEPARATOR);
        for (i, (name, value)) in params.iter().enumerate() {
            if i > 0 {
                key.push(PAIR_SEPARATOR);
            }
            escape_into(&mut key, name, PARAM_KEY_SPECIALS);
            key.push(VALUE_SEPARATOR);
            escape_into(&mut key, &value.to_string(), PARAM_VALUE_SPECIALS);
        }
    }
    key
}

/// Returns true when `key` was produced by [`canonical_key`] for `namespace`.
pub fn belongs_to(key: &str, namespace: &str) -> bool {
    let mut prefix = String::with_capacity(namespace.len());
    escape_into(&mut prefix, namespace, NAMESPACE_SPECIALS);

    let Some(rest) = key.strip_prefix(prefix.as_str()) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let Some(pairs) = rest.strip_prefix(NAMESPACE_SEPARATOR) else {
        return false;
    };
    // The first param name ends at the first unescaped `:` and never holds
    // an unescaped `_`
    match find_unescaped(pairs, VALUE_SEPARATOR) {
        Some(end) => find_unescaped(&pairs[..end], NAMESPACE_SEPARATOR).is_none(),
        None => false,
    }
}

fn escape_into(out: &mut String, raw: &str, specials: &[char]) {
    for c in raw.chars() {
        if c == ESCAPE || specials.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Byte offset of the first `target` not preceded by an escape.
fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_without_params() {
        assert_eq!(canonical_key("cars_list", None), "cars_list");
        assert_eq!(canonical_key("cars_list", Some(&Params::new())), "cars_list");
    }

    #[test]
    fn test_canonical_key_sorts_params() {
        let params = Params::new().with("page", 2i64).with("country", "US");
        assert_eq!(
            canonical_key("cars_list", Some(&params)),
            "cars_list_country:US|page:2"
        );
    }

    #[test]
    fn test_canonical_key_insertion_order_independent() {
        let a = Params::new().with("b", 2i64).with("a", 1i64);
        let b: Params = vec![("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(canonical_key("n", Some(&a)), canonical_key("n", Some(&b)));
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(42i64).to_string(), "42");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::from("copart_com").to_string(), "copart_com");
    }

    #[test]
    fn test_canonical_key_escapes_separators() {
        let params = Params::new()
            .with("domain", "copart_com")
            .with("q", r"a|b:c\d")
            .with("sort_by", "year");
        assert_eq!(
            canonical_key("car_details", Some(&params)),
            r"car_details_domain:copart_com|q:a\|b\:c\\d|sort\_by:year"
        );
    }

    #[test]
    fn test_canonical_key_smuggled_pair_is_distinct() {
        let smuggled = Params::new().with("country", "US|manufacturer_id:5");
        let genuine = Params::new()
            .with("country", "US")
            .with("manufacturer_id", "5");
        assert_ne!(
            canonical_key("cars_list", Some(&smuggled)),
            canonical_key("cars_list", Some(&genuine))
        );
    }

    #[test]
    fn test_canonical_key_namespace_cannot_mimic_params() {
        let params = Params::new().with("x", 1i64);
        assert_ne!(canonical_key("a_x:1", None), canonical_key("a", Some(&params)));

        let nested = Params::new().with("x_y", 1i64);
        let flat = Params::new().with("y", 1i64);
        assert_ne!(
            canonical_key("a", Some(&nested)),
            canonical_key("a_x", Some(&flat))
        );
    }

    #[test]
    fn test_belongs_to() {
        assert!(belongs_to("cars_list", "cars_list"));
        assert!(belongs_to("cars_list_page:1", "cars_list"));
        assert!(belongs_to(r"cars_list_q:a\|b", "cars_list"));
        assert!(!belongs_to("cars_listing", "cars_list"));
        assert!(!belongs_to("cars_list_draft", "cars_list"));
        assert!(!belongs_to("theme", "cars_list"));
    }

    #[test]
    fn test_belongs_to_nested_namespace() {
        let key = canonical_key("cars_list", Some(&Params::new().with("page", 1i64)));
        assert!(belongs_to(&key, "cars_list"));
        assert!(!belongs_to(&key, "cars"));
    }
}
