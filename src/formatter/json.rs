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

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;

use crate::error::Error;
use crate::formatter::Formatter;
use crate::record::Record;
use crate::writer::Writer;

/// The JSON tree formatter.
///
/// Every record becomes one compact JSON object holding the intrinsic fields
/// `message`, `severity`, `timestamp` (microseconds since epoch), `process`
/// (pid), and `thread` (`0x`-prefixed hex id), followed by the record's
/// attributes, innermost layer first.
///
/// Attributes route to a location in the tree addressed by a JSON pointer
/// (RFC 6901); unlisted attributes land at the default pointer, the root
/// unless overridden. Renaming applies after routing and substitutes only
/// the final key. For speed no de-duplication happens by default, so
/// repeated names produce repeated keys; [`JsonFormatterBuilder::unique`]
/// switches to last-write-wins at the cost of a lookup per field.
///
/// # Examples
///
/// ```
/// use umbra::formatter::JsonFormatter;
///
/// let formatter = JsonFormatter::builder()
///     .route("/fields", ["message", "severity"])
///     .rename("message", "#message")
///     .newline()
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    routes: HashMap<String, Vec<String>>,
    default_route: Vec<String>,
    renames: HashMap<String, String>,
    unique: bool,
    newline: bool,
}

impl JsonFormatter {
    /// A formatter producing a flat tree, duplicates allowed, no trailing
    /// newline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a formatter.
    pub fn builder() -> JsonFormatterBuilder {
        JsonFormatterBuilder {
            formatter: JsonFormatter::default(),
        }
    }

    fn put(&self, root: &mut Tree, name: &str, value: serde_json::Value) {
        let path = self.routes.get(name).unwrap_or(&self.default_route);
        let key = self.renames.get(name).map(String::as_str).unwrap_or(name);
        descend(root, path).insert(key, value, self.unique);
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<(), Error> {
        let mut root = Tree::default();

        self.put(&mut root, "message", record.message().into());
        self.put(&mut root, "severity", record.severity().into());
        self.put(&mut root, "timestamp", record.timestamp().as_microsecond().into());
        self.put(&mut root, "process", record.pid().into());
        self.put(&mut root, "thread", format!("{:#x}", record.tid()).into());
        for (name, value) in record.attributes().iter() {
            self.put(&mut root, name, value.to_json());
        }

        serde_json::to_writer(&mut *writer, &root).map_err(Error::format)?;
        if self.newline {
            writer.push_bytes(b"\n");
        }
        Ok(())
    }
}

/// Builder for [`JsonFormatter`].
#[must_use = "call `build` to finish the formatter"]
#[derive(Debug, Default)]
pub struct JsonFormatterBuilder {
    formatter: JsonFormatter,
}

impl JsonFormatterBuilder {
    /// Route the listed attributes to the location `pointer` addresses.
    pub fn route<I, S>(mut self, pointer: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = parse_pointer(pointer);
        for name in attributes {
            self.formatter.routes.insert(name.into(), segments.clone());
        }
        self
    }

    /// Route every unlisted attribute to the location `pointer` addresses.
    /// Defaults to the root.
    pub fn route_default(mut self, pointer: &str) -> Self {
        self.formatter.default_route = parse_pointer(pointer);
        self
    }

    /// Substitute the final key emitted for `from` with `to`. Renaming
    /// applies after routing.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.formatter.renames.insert(from.into(), to.into());
        self
    }

    /// Enforce key uniqueness within each object; later writes win.
    pub fn unique(mut self) -> Self {
        self.formatter.unique = true;
        self
    }

    /// Append a newline after each record.
    pub fn newline(mut self) -> Self {
        self.formatter.newline = true;
        self
    }

    /// Finish the formatter.
    pub fn build(self) -> JsonFormatter {
        self.formatter
    }
}

/// `""` and `"/"` both address the root; `~1` and `~0` unescape per RFC 6901.
fn parse_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() || pointer == "/" {
        return Vec::new();
    }
    pointer
        .strip_prefix('/')
        .unwrap_or(pointer)
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// An insertion-ordered JSON object that, unlike `serde_json::Map`, can hold
/// duplicate keys.
#[derive(Debug, Default)]
struct Tree {
    entries: Vec<(String, Node)>,
}

#[derive(Debug)]
enum Node {
    Branch(Tree),
    Leaf(serde_json::Value),
}

fn descend<'t>(mut tree: &'t mut Tree, path: &[String]) -> &'t mut Tree {
    for segment in path {
        let index = match tree.entries.iter().position(|(key, _)| key == segment) {
            Some(index) => {
                // A leaf standing where the pointer descends is overwritten.
                if !matches!(tree.entries[index].1, Node::Branch(_)) {
                    tree.entries[index].1 = Node::Branch(Tree::default());
                }
                index
            }
            None => {
                tree.entries.push((segment.clone(), Node::Branch(Tree::default())));
                tree.entries.len() - 1
            }
        };
        tree = match &mut tree.entries[index].1 {
            Node::Branch(child) => child,
            Node::Leaf(_) => unreachable!("the entry was just made a branch"),
        };
    }
    tree
}

impl Tree {
    fn insert(&mut self, key: &str, value: serde_json::Value, unique: bool) {
        if unique {
            if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| existing == key) {
                entry.1 = Node::Leaf(value);
                return;
            }
        }
        self.entries.push((key.to_owned(), Node::Leaf(value)));
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Branch(tree) => tree.serialize(serializer),
            Node::Leaf(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointers_unescape_per_rfc_6901() {
        assert!(parse_pointer("").is_empty());
        assert!(parse_pointer("/").is_empty());
        assert_eq!(parse_pointer("/fields"), ["fields"]);
        assert_eq!(parse_pointer("/a/b"), ["a", "b"]);
        assert_eq!(parse_pointer("/a~1b/c~0d"), ["a/b", "c~d"]);
    }

    #[test]
    fn trees_keep_duplicate_keys_unless_unique() {
        let mut tree = Tree::default();
        tree.insert("key", 1.into(), false);
        tree.insert("key", 2.into(), false);
        assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"key":1,"key":2}"#);

        let mut tree = Tree::default();
        tree.insert("key", 1.into(), true);
        tree.insert("key", 2.into(), true);
        assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"key":2}"#);
    }

    #[test]
    fn descend_builds_intermediate_objects() {
        let mut tree = Tree::default();
        descend(&mut tree, &["a".to_owned(), "b".to_owned()]).insert("key", 1.into(), false);
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"a":{"b":{"key":1}}}"#
        );
    }
}
