// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Attributes attached to log records.
//!
//! Attributes come in layers. A [`Attributes`] layer borrows its names and
//! values from the call site; an [`AttributeSet`] layer owns its data and
//! backs scoped context. Layers stack into an [`AttributePack`], which is
//! searched innermost first.

use std::fmt;
use std::slice;

/// A tagged attribute value viewed over caller-owned data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A double precision float.
    F64(f64),
    /// A borrowed string.
    Str(&'a str),
}

impl Value<'_> {
    /// The kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "signed",
            Value::U64(_) => "unsigned",
            Value::F64(_) => "float",
            Value::Str(_) => "string",
        }
    }

    pub(crate) fn to_json(self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => v.into(),
            Value::I64(v) => v.into(),
            Value::U64(v) => v.into(),
            Value::F64(v) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(v) => v.into(),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => fmt::Display::fmt(v, f),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::U64(v) => fmt::Display::fmt(v, f),
            Value::F64(v) => fmt::Display::fmt(v, f),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<()> for Value<'_> {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::I64(v.into())
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Value::U64(v.into())
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

/// An attribute value that owns its data, used by scoped layers.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A double precision float.
    F64(f64),
    /// An owned string.
    String(String),
}

impl OwnedValue {
    pub(crate) fn as_value(&self) -> Value<'_> {
        match self {
            OwnedValue::Null => Value::Null,
            OwnedValue::Bool(v) => Value::Bool(*v),
            OwnedValue::I64(v) => Value::I64(*v),
            OwnedValue::U64(v) => Value::U64(*v),
            OwnedValue::F64(v) => Value::F64(*v),
            OwnedValue::String(v) => Value::Str(v),
        }
    }
}

impl From<()> for OwnedValue {
    fn from((): ()) -> Self {
        OwnedValue::Null
    }
}

impl From<bool> for OwnedValue {
    fn from(v: bool) -> Self {
        OwnedValue::Bool(v)
    }
}

impl From<i32> for OwnedValue {
    fn from(v: i32) -> Self {
        OwnedValue::I64(v.into())
    }
}

impl From<i64> for OwnedValue {
    fn from(v: i64) -> Self {
        OwnedValue::I64(v)
    }
}

impl From<u32> for OwnedValue {
    fn from(v: u32) -> Self {
        OwnedValue::U64(v.into())
    }
}

impl From<u64> for OwnedValue {
    fn from(v: u64) -> Self {
        OwnedValue::U64(v)
    }
}

impl From<f64> for OwnedValue {
    fn from(v: f64) -> Self {
        OwnedValue::F64(v)
    }
}

impl From<&str> for OwnedValue {
    fn from(v: &str) -> Self {
        OwnedValue::String(v.to_owned())
    }
}

impl From<String> for OwnedValue {
    fn from(v: String) -> Self {
        OwnedValue::String(v)
    }
}

/// One layer of borrowed attributes built at the log call site.
///
/// Duplicate names are permitted; lookup returns the first match.
///
/// # Examples
///
/// ```
/// use umbra::attribute::Attributes;
///
/// let attributes = Attributes::new().with("key", 42).with("ip", "[::]");
/// assert_eq!(attributes.len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Attributes<'a> {
    entries: Vec<(&'a str, Value<'a>)>,
}

impl<'a> Attributes<'a> {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute, returning the layer for chaining.
    pub fn with(mut self, name: &'a str, value: impl Into<Value<'a>>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an attribute.
    pub fn push(&mut self, name: &'a str, value: impl Into<Value<'a>>) {
        self.entries.push((name, value.into()));
    }

    /// The number of attributes in this layer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this layer holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first value recorded under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

impl<'a> FromIterator<(&'a str, Value<'a>)> for Attributes<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value<'a>)>>(iter: I) -> Self {
        Attributes {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One layer of owned attributes, the backing store for scoped context.
///
/// # Examples
///
/// ```
/// use umbra::attribute::AttributeSet;
///
/// let layer = AttributeSet::new().with("request", 42u64);
/// ```
#[derive(Debug, Default, Clone)]
pub struct AttributeSet {
    entries: Vec<(String, OwnedValue)>,
}

impl AttributeSet {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute, returning the layer for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OwnedValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<OwnedValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// The number of attributes in this layer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this layer holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first value recorded under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value<'_>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_value())
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<OwnedValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttributeSet {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A zero-copy view over one attribute layer.
#[derive(Debug, Clone, Copy)]
pub enum AttributeView<'a> {
    /// A borrowed layer assembled at the call site.
    Borrowed(&'a Attributes<'a>),
    /// An owned layer, typically pushed by a scoped guard.
    Owned(&'a AttributeSet),
}

impl<'a> AttributeView<'a> {
    /// The number of attributes in the layer.
    pub fn len(&self) -> usize {
        match self {
            AttributeView::Borrowed(layer) => layer.len(),
            AttributeView::Owned(layer) => layer.len(),
        }
    }

    /// Whether the layer holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first value recorded under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        match self {
            AttributeView::Borrowed(layer) => layer.get(name),
            AttributeView::Owned(layer) => layer
                .entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_value()),
        }
    }

    /// Iterate the layer's `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> AttributeIter<'a> {
        let inner = match self {
            AttributeView::Borrowed(layer) => IterInner::Borrowed(layer.entries.iter()),
            AttributeView::Owned(layer) => IterInner::Owned(layer.entries.iter()),
        };
        AttributeIter { inner }
    }
}

impl<'a> From<&'a Attributes<'a>> for AttributeView<'a> {
    fn from(layer: &'a Attributes<'a>) -> Self {
        AttributeView::Borrowed(layer)
    }
}

impl<'a> From<&'a AttributeSet> for AttributeView<'a> {
    fn from(layer: &'a AttributeSet) -> Self {
        AttributeView::Owned(layer)
    }
}

/// Iterator over one layer's `(name, value)` pairs.
#[derive(Debug, Clone)]
pub struct AttributeIter<'a> {
    inner: IterInner<'a>,
}

#[derive(Debug, Clone)]
enum IterInner<'a> {
    Borrowed(slice::Iter<'a, (&'a str, Value<'a>)>),
    Owned(slice::Iter<'a, (String, OwnedValue)>),
}

impl<'a> Iterator for AttributeIter<'a> {
    type Item = (&'a str, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Borrowed(iter) => iter.next().map(|(name, value)| (*name, *value)),
            IterInner::Owned(iter) => iter
                .next()
                .map(|(name, value)| (name.as_str(), value.as_value())),
        }
    }
}

/// An ordered stack of attribute layers.
///
/// The layer at index zero is the innermost; lookup proceeds innermost first
/// and stops at the first hit.
#[derive(Debug, Default, Clone)]
pub struct AttributePack<'a> {
    layers: Vec<AttributeView<'a>>,
}

pub(crate) static EMPTY_PACK: AttributePack<'static> = AttributePack { layers: Vec::new() };

impl<'a> AttributePack<'a> {
    /// Create an empty pack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer onto the outside of the stack.
    pub fn push(&mut self, layer: impl Into<AttributeView<'a>>) {
        self.layers.push(layer.into());
    }

    /// The stacked layers, innermost first.
    pub fn layers(&self) -> &[AttributeView<'a>] {
        &self.layers
    }

    /// The number of layers in the pack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the pack holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The first value recorded under `name`, searching innermost first.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        self.layers.iter().find_map(|layer| layer.get(name))
    }

    /// Iterate all `(name, value)` pairs, innermost layer first.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Value<'a>)> + '_ {
        self.layers.iter().flat_map(|layer| layer.iter())
    }
}
