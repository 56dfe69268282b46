//! Typed values carried by dynamic report fields.
//!
//! A form config declares a [`ValueKind`] per field; the submitted value is
//! an [`AttributeValue`] whose variant is the kind it was set as. Set kinds
//! are de-duplicated on the way in, preserving first-seen order.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormConfigError;

/// Declared value type of a form config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "VALUE_TYPE_INT")]
    Int,
    #[serde(rename = "VALUE_TYPE_STRING")]
    String,
    #[serde(rename = "VALUE_TYPE_BOOL")]
    Bool,
    #[serde(rename = "VALUE_TYPE_INT_ARRAY")]
    IntArray,
    #[serde(rename = "VALUE_TYPE_STRING_ARRAY")]
    StringArray,
    #[serde(rename = "VALUE_TYPE_INT_SET")]
    IntSet,
    #[serde(rename = "VALUE_TYPE_STRING_SET")]
    StringSet,
    #[serde(rename = "VALUE_TYPE_NULL")]
    Null,
}

impl ValueKind {
    pub const ALL: [ValueKind; 8] = [
        ValueKind::Int,
        ValueKind::String,
        ValueKind::Bool,
        ValueKind::IntArray,
        ValueKind::StringArray,
        ValueKind::IntSet,
        ValueKind::StringSet,
        ValueKind::Null,
    ];

    /// Wire name, e.g. `VALUE_TYPE_INT_SET`.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Int => "VALUE_TYPE_INT",
            ValueKind::String => "VALUE_TYPE_STRING",
            ValueKind::Bool => "VALUE_TYPE_BOOL",
            ValueKind::IntArray => "VALUE_TYPE_INT_ARRAY",
            ValueKind::StringArray => "VALUE_TYPE_STRING_ARRAY",
            ValueKind::IntSet => "VALUE_TYPE_INT_SET",
            ValueKind::StringSet => "VALUE_TYPE_STRING_SET",
            ValueKind::Null => "VALUE_TYPE_NULL",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = FormConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| FormConfigError::UnknownValueType(s.to_string()))
    }
}

/// A dynamic field value. Exactly one kind is populated at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Int(i32),
    String(String),
    Bool(bool),
    IntArray(Vec<i32>),
    StringArray(Vec<String>),
    IntSet(Vec<i32>),
    StringSet(Vec<String>),
}

impl AttributeValue {
    pub fn int(v: i32) -> Self {
        AttributeValue::Int(v)
    }

    pub fn string(v: impl Into<String>) -> Self {
        AttributeValue::String(v.into())
    }

    pub fn bool(v: bool) -> Self {
        AttributeValue::Bool(v)
    }

    pub fn int_array(v: Vec<i32>) -> Self {
        AttributeValue::IntArray(v)
    }

    pub fn string_array(v: Vec<String>) -> Self {
        AttributeValue::StringArray(v)
    }

    /// Builds an int set, dropping later duplicates.
    pub fn int_set(v: impl IntoIterator<Item = i32>) -> Self {
        AttributeValue::IntSet(dedup_preserving_order(v))
    }

    /// Builds a string set, dropping later duplicates.
    pub fn string_set<S: Into<String>>(v: impl IntoIterator<Item = S>) -> Self {
        AttributeValue::StringSet(dedup_preserving_order(v.into_iter().map(Into::into)))
    }

    // ── Setters ──────────────────────────────────────────────────────────

    pub fn set_int(&mut self, v: i32) {
        *self = Self::int(v);
    }

    pub fn set_string(&mut self, v: impl Into<String>) {
        *self = Self::string(v);
    }

    pub fn set_bool(&mut self, v: bool) {
        *self = Self::bool(v);
    }

    pub fn set_int_array(&mut self, v: Vec<i32>) {
        *self = Self::int_array(v);
    }

    pub fn set_string_array(&mut self, v: Vec<String>) {
        *self = Self::string_array(v);
    }

    pub fn set_int_set(&mut self, v: Vec<i32>) {
        *self = Self::int_set(v);
    }

    pub fn set_string_set(&mut self, v: Vec<String>) {
        *self = Self::string_set(v);
    }

    /// The kind this value was set as.
    pub fn kind(&self) -> ValueKind {
        match self {
            AttributeValue::Int(_) => ValueKind::Int,
            AttributeValue::String(_) => ValueKind::String,
            AttributeValue::Bool(_) => ValueKind::Bool,
            AttributeValue::IntArray(_) => ValueKind::IntArray,
            AttributeValue::StringArray(_) => ValueKind::StringArray,
            AttributeValue::IntSet(_) => ValueKind::IntSet,
            AttributeValue::StringSet(_) => ValueKind::StringSet,
        }
    }

    /// Re-applies set semantics, e.g. after loading from a backend that
    /// does not enforce them.
    pub fn dedup(self) -> Self {
        match self {
            AttributeValue::IntSet(v) => Self::int_set(v),
            AttributeValue::StringSet(v) => Self::string_set(v),
            other => other,
        }
    }

    /// Whether this value fulfils a required field declared as `declared`.
    ///
    /// Int, Bool and Null declarations have no notion of emptiness: once the
    /// field entry exists the requirement is met, even for `0` or `false`.
    /// Every other declaration needs a non-empty value of that same kind.
    pub fn satisfies_required(&self, declared: ValueKind) -> bool {
        match (declared, self) {
            (ValueKind::Int | ValueKind::Bool | ValueKind::Null, _) => true,
            (ValueKind::String, AttributeValue::String(s)) => !s.is_empty(),
            (ValueKind::IntArray, AttributeValue::IntArray(v)) => !v.is_empty(),
            (ValueKind::StringArray, AttributeValue::StringArray(v)) => !v.is_empty(),
            (ValueKind::IntSet, AttributeValue::IntSet(v)) => !v.is_empty(),
            (ValueKind::StringSet, AttributeValue::StringSet(v)) => !v.is_empty(),
            _ => false,
        }
    }
}

fn dedup_preserving_order<T: Eq + Hash + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn int_set_drops_later_duplicates() {
        let mut v = AttributeValue::bool(false);
        v.set_int_set(vec![1, 2, 3, 5, 6, 1]);
        assert_eq!(v, AttributeValue::IntSet(vec![1, 2, 3, 5, 6]));
    }

    #[test]
    fn string_set_drops_later_duplicates() {
        let mut v = AttributeValue::bool(false);
        v.set_string_set(strings(&[
            "Charles", "Eric", "Gabriel", "Hanna", "Beatriz", "Gabriel",
        ]));
        assert_eq!(
            v,
            AttributeValue::StringSet(strings(&["Charles", "Eric", "Gabriel", "Hanna", "Beatriz"]))
        );
    }

    #[test]
    fn arrays_keep_duplicates_and_order() {
        let mut v = AttributeValue::int(0);
        v.set_int_array(vec![9, 10, 8, 10]);
        assert_eq!(v, AttributeValue::IntArray(vec![9, 10, 8, 10]));

        v.set_string_array(strings(&["b", "a", "b"]));
        assert_eq!(v, AttributeValue::StringArray(strings(&["b", "a", "b"])));
    }

    #[test]
    fn setters_replace_the_kind() {
        let mut v = AttributeValue::int(3);
        v.set_string("title");
        assert_eq!(v.kind(), ValueKind::String);
        v.set_bool(true);
        assert_eq!(v.kind(), ValueKind::Bool);
    }

    #[test]
    fn dedup_only_touches_sets() {
        assert_eq!(
            AttributeValue::IntSet(vec![4, 4, 1]).dedup(),
            AttributeValue::IntSet(vec![4, 1])
        );
        assert_eq!(
            AttributeValue::IntArray(vec![4, 4, 1]).dedup(),
            AttributeValue::IntArray(vec![4, 4, 1])
        );
    }

    #[test]
    fn value_kind_parses_wire_names() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.as_str().parse::<ValueKind>().unwrap(), kind);
        }
        assert!("VALUE_TYPE_UNDEFINED".parse::<ValueKind>().is_err());
        assert!("".parse::<ValueKind>().is_err());
    }

    #[test]
    fn numeric_and_bool_requirements_are_always_met() {
        // Known quirk: a zero score still satisfies a required Int field.
        assert!(AttributeValue::int(0).satisfies_required(ValueKind::Int));
        assert!(AttributeValue::bool(false).satisfies_required(ValueKind::Bool));
        assert!(AttributeValue::string("").satisfies_required(ValueKind::Int));
    }

    #[test]
    fn collection_requirements_need_content() {
        assert!(!AttributeValue::string("").satisfies_required(ValueKind::String));
        assert!(AttributeValue::string("x").satisfies_required(ValueKind::String));
        assert!(!AttributeValue::IntSet(vec![]).satisfies_required(ValueKind::IntSet));
        assert!(AttributeValue::int_set([1]).satisfies_required(ValueKind::IntSet));
        assert!(!AttributeValue::int(5).satisfies_required(ValueKind::String));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(AttributeValue::int_set([1, 1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({ "int_set": [1, 2] }));
        let back: AttributeValue = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), ValueKind::IntSet);
    }
}
