//! String attribute whose planned value ignores letter case.
//!
//! PowerScale normalizes the casing of several names it hands back (access
//! zones being the common case: a zone configured as `"System"` reads back as
//! `"system"`). Storing those attributes as [`CaseInsensitiveString`] keeps the
//! plan quiet when only the casing differs, while the value itself keeps the
//! casing it was built with.

use super::{same_kind, AttrType, AttrValue, SemanticEquals, StringValue, Value};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::any::Any;
use std::fmt;

/// Compares two strings under Unicode case folding.
///
/// Each character is lower-cased, upper-cased and lower-cased again, so
/// multi-character mappings fold too and both sharp s forms land on `"ss"`:
/// `"Straße"`, `"STRAẞE"` and `"STRASSE"` all match, as do `"ΣΑΣ"` and `"σας"`.
pub fn fold_eq(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    fold(a).eq(fold(b))
}

fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
}

/// A string value compared case-insensitively during planning.
///
/// The derived `PartialEq` is exact; use [`SemanticEquals::semantic_equals`]
/// for the case-insensitive comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseInsensitiveString(StringValue);

impl CaseInsensitiveString {
    /// Known value, casing kept verbatim.
    pub fn new<S: Into<String>>(value: S) -> Self {
        CaseInsensitiveString(Value::Known(value.into()))
    }

    pub fn null() -> Self {
        CaseInsensitiveString(Value::Null)
    }

    /// Value that will only be known after apply.
    pub fn unknown() -> Self {
        CaseInsensitiveString(Value::Unknown)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_unknown()
    }

    /// The string with its original casing.
    ///
    /// Null and unknown values yield the empty string; use [`value`](Self::value)
    /// to tell them apart from a known empty string.
    pub fn as_str(&self) -> &str {
        self.value().unwrap_or_default()
    }

    pub fn value(&self) -> Option<&str> {
        self.0.as_known().map(String::as_str)
    }

    pub fn into_inner(self) -> StringValue {
        self.0
    }
}

impl From<StringValue> for CaseInsensitiveString {
    fn from(v: StringValue) -> Self {
        CaseInsensitiveString(v)
    }
}

impl From<&str> for CaseInsensitiveString {
    fn from(v: &str) -> Self {
        CaseInsensitiveString::new(v)
    }
}

impl fmt::Display for CaseInsensitiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AttrValue for CaseInsensitiveString {
    fn attr_type(&self) -> AttrType {
        AttrType::CaseInsensitiveString
    }

    fn is_null(&self) -> bool {
        self.0.is_null()
    }

    fn is_unknown(&self) -> bool {
        self.0.is_unknown()
    }

    fn to_json(&self) -> Value<Json> {
        self.0.clone().map(Json::String)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn from_json(json: Option<&Json>) -> Result<Self> {
        StringValue::from_json(json)
            .map(CaseInsensitiveString)
            .map_err(|_| {
                crate::error::Error::invalid_value(
                    AttrType::CaseInsensitiveString,
                    "expected a string",
                )
            })
    }

    fn new_unknown() -> Self {
        CaseInsensitiveString::unknown()
    }
}

impl SemanticEquals for CaseInsensitiveString {
    fn semantic_equals(&self, other: &dyn AttrValue) -> Result<bool> {
        let other = same_kind(self, other)?;
        let equal = match (&self.0, &other.0) {
            (Value::Known(a), Value::Known(b)) => fold_eq(a, b),
            (a, b) => a == b,
        };
        tracing::trace!(left = %self, right = %other, equal, "case-insensitive comparison");
        Ok(equal)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::types::{BoolValue, NumberValue};
    use serde_json::Number;

    fn ci(s: &str) -> CaseInsensitiveString {
        CaseInsensitiveString::new(s)
    }

    #[test]
    fn test_casing_is_preserved() {
        for s in &["System", "system", "SYSTEM", "Straße", "", "zone-01 ÅÄÖ"] {
            assert_eq!(ci(s).as_str(), *s);
            assert_eq!(ci(s).value(), Some(*s));
        }
    }

    #[test]
    fn test_null_and_unknown_read_as_empty_string() {
        assert_eq!(CaseInsensitiveString::null().as_str(), "");
        assert_eq!(CaseInsensitiveString::unknown().as_str(), "");
        assert_eq!(CaseInsensitiveString::null().value(), None);
        assert_eq!(CaseInsensitiveString::unknown().value(), None);
        assert_eq!(ci("").value(), Some(""));
    }

    #[test]
    fn test_state_predicates() {
        assert!(CaseInsensitiveString::null().is_null());
        assert!(!CaseInsensitiveString::null().is_unknown());
        assert!(CaseInsensitiveString::unknown().is_unknown());
        assert!(!CaseInsensitiveString::unknown().is_null());
        assert!(!ci("x").is_null() && !ci("x").is_unknown());
        assert!(CaseInsensitiveString::default().is_null());
    }

    #[test]
    fn test_semantic_equals_known() {
        assert!(ci("System").semantic_equals(&ci("system")).unwrap());
        assert!(ci("ZONE1").semantic_equals(&ci("zone1")).unwrap());
        assert!(!ci("SYSTEM1").semantic_equals(&ci("system2")).unwrap());
        assert!(!ci("Zone1").semantic_equals(&ci("Zone2")).unwrap());
        assert!(!ci("zone").semantic_equals(&ci("zone ")).unwrap());
        assert!(ci("").semantic_equals(&ci("")).unwrap());
    }

    #[test]
    fn test_semantic_equals_unicode_folding() {
        assert!(ci("Straße").semantic_equals(&ci("STRASSE")).unwrap());
        assert!(ci("ÅSA").semantic_equals(&ci("åsa")).unwrap());
        assert!(ci("ΣΑΣ").semantic_equals(&ci("σας")).unwrap());
        assert!(ci("\u{212A}elvin").semantic_equals(&ci("kelvin")).unwrap());
        assert!(!ci("Straße").semantic_equals(&ci("STRASE")).unwrap());
        assert!(ci("STRAẞE").semantic_equals(&ci("Straße")).unwrap());
        assert!(ci("STRAẞE").semantic_equals(&ci("strasse")).unwrap());
        assert!(ci("\u{1E9E}").semantic_equals(&ci("ss")).unwrap());
        assert!(ci("ß").semantic_equals(&ci("SS")).unwrap());
    }

    #[test]
    fn test_semantic_equals_null_and_unknown() {
        let null = CaseInsensitiveString::null();
        let unknown = CaseInsensitiveString::unknown();

        assert!(null.semantic_equals(&CaseInsensitiveString::null()).unwrap());
        assert!(unknown.semantic_equals(&CaseInsensitiveString::unknown()).unwrap());
        assert!(!null.semantic_equals(&unknown).unwrap());
        assert!(!null.semantic_equals(&ci("")).unwrap());
        assert!(!unknown.semantic_equals(&ci("System")).unwrap());
        assert!(!ci("System").semantic_equals(&null).unwrap());
    }

    #[test]
    fn test_semantic_equals_properties() {
        let samples = [
            ci("System"),
            ci("system"),
            ci("SYSTEM"),
            ci("Zone1"),
            ci("Straße"),
            ci("STRASSE"),
            ci("STRAẞE"),
            CaseInsensitiveString::null(),
            CaseInsensitiveString::unknown(),
        ];
        for a in &samples {
            assert!(a.semantic_equals(a).unwrap());
            for b in &samples {
                let ab = a.semantic_equals(b).unwrap();
                assert_eq!(ab, b.semantic_equals(a).unwrap());
                assert_eq!(ab, a.semantic_equals(b).unwrap());
                for c in &samples {
                    if ab && b.semantic_equals(c).unwrap() {
                        assert!(a.semantic_equals(c).unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn test_semantic_equals_type_mismatch() {
        let res = ci("System").semantic_equals(&StringValue::Known("System".to_owned()));
        match res {
            Err(Error::TypeMismatch { expected, got }) => {
                assert_eq!(expected, "CaseInsensitiveValue");
                assert_eq!(got, "basetypes.StringValue");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(ci("1")
            .semantic_equals(&NumberValue::Known(Number::from(1)))
            .is_err());
        assert!(CaseInsensitiveString::null()
            .semantic_equals(&BoolValue::Null)
            .is_err());
    }

    #[test]
    fn test_reconcile_adopts_other_casing() {
        let config = ci("System");
        let remote = ci("system");

        assert_eq!(config.reconcile(&remote).unwrap(), Some(ci("system")));
        assert_eq!(remote.reconcile(&config).unwrap(), Some(ci("System")));
        assert_eq!(config.reconcile(&ci("Zone2")).unwrap(), None);
        assert_eq!(config.as_str(), "System");
        assert!(config
            .reconcile(&StringValue::Known("system".to_owned()))
            .is_err());
    }

    #[test]
    fn test_fold_eq() {
        assert!(fold_eq("Access-Zone", "access-zone"));
        assert!(fold_eq("Ärger", "äRGER"));
        assert!(fold_eq("STRAẞE", "Straße"));
        assert!(fold_eq("ẞ", "ss"));
        assert!(!fold_eq("abc", "abd"));
        assert!(!fold_eq("abc", "abcd"));
    }

    #[test]
    fn test_serde() {
        let v: CaseInsensitiveString = serde_json::from_str("\"System\"").unwrap();
        assert_eq!(v, ci("System"));
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"System\"");

        let null: CaseInsensitiveString = serde_json::from_str("null").unwrap();
        assert!(null.is_null());
        assert!(serde_json::to_string(&CaseInsensitiveString::unknown()).is_err());
    }

    #[test]
    fn test_from_json() {
        let v = CaseInsensitiveString::from_json(Some(&Json::from("Zone1"))).unwrap();
        assert_eq!(v.as_str(), "Zone1");
        assert!(CaseInsensitiveString::from_json(None).unwrap().is_null());
        assert!(CaseInsensitiveString::from_json(Some(&Json::from(3))).is_err());
    }
}
