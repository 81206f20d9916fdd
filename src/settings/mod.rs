//! Hierarchical settings for folio projects.
//!
//! Folio persists one settings file per project as TOML (named sections of
//! key=value pairs) at the project directory. Default values come from an
//! XML template per media type; the [`resolver`] merges the two so that
//! persisted values always win and newly introduced defaults are migrated
//! into the persisted file.

mod resolver;
mod store;
mod template;

pub use resolver::{OverrideChain, Resolver, ScopedSettings};
pub use store::SettingsStore;
pub use template::{load_template, parse_template};

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single entry in a [`SettingsTree`]: either a text value or a nested
/// section. Every leaf is text; callers convert as needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(String),
    Section(SettingsTree),
}

/// Hierarchical key-value configuration data.
///
/// Keys are unique within a section and kept sorted, so serializing an
/// unchanged tree twice produces byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTree {
    entries: BTreeMap<String, Node>,
}

impl SettingsTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a leaf value by dotted key path (e.g. `"TeX.engine"`).
    pub fn get(&self, path: &str) -> Option<&str> {
        match self.get_node(path)? {
            Node::Leaf(v) => Some(v),
            Node::Section(_) => None,
        }
    }

    /// Looks up a nested section by dotted key path.
    pub fn section(&self, path: &str) -> Option<&SettingsTree> {
        match self.get_node(path)? {
            Node::Section(t) => Some(t),
            Node::Leaf(_) => None,
        }
    }

    fn get_node(&self, path: &str) -> Option<&Node> {
        let (head, rest) = match path.split_once('.') {
            Some((h, r)) => (h, Some(r)),
            None => (path, None),
        };
        let node = self.entries.get(head)?;
        match rest {
            None => Some(node),
            Some(rest) => match node {
                Node::Section(t) => t.get_node(rest),
                Node::Leaf(_) => None,
            },
        }
    }

    /// Sets a leaf value at a dotted key path, creating intermediate
    /// sections as needed. A leaf occupying an intermediate position is
    /// replaced by a section (last write wins).
    pub fn set(&mut self, path: &str, value: impl Into<String>) {
        match path.split_once('.') {
            None => {
                self.entries.insert(path.to_string(), Node::Leaf(value.into()));
            }
            Some((head, rest)) => {
                let node = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| Node::Section(SettingsTree::new()));
                if let Node::Leaf(_) = node {
                    *node = Node::Section(SettingsTree::new());
                }
                if let Node::Section(t) = node {
                    t.set(rest, value);
                }
            }
        }
    }

    /// Names of the immediate child sections, in key order.
    pub fn section_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(k, v)| match v {
                Node::Section(_) => Some(k.as_str()),
                Node::Leaf(_) => None,
            })
            .collect()
    }

    /// Inserts every key path present in `template` but absent here,
    /// returning the number of inserted leaves. Existing values are never
    /// overwritten; keys absent from the template are left untouched.
    pub fn merge_missing(&mut self, template: &SettingsTree) -> usize {
        let mut inserted = 0;
        for (key, node) in &template.entries {
            match self.entries.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    inserted += node.leaf_count();
                    slot.insert(node.clone());
                }
                Entry::Occupied(mut slot) => {
                    // Persisted entries win; only matching sections recurse.
                    if let (Node::Section(existing), Node::Section(tmpl)) =
                        (slot.get_mut(), node)
                    {
                        inserted += existing.merge_missing(tmpl);
                    }
                }
            }
        }
        inserted
    }

    /// Deep-merges `other` over this tree: values from `other` win,
    /// sections merge recursively. Used to flatten an override chain.
    pub fn overlay(&mut self, other: &SettingsTree) {
        for (key, node) in &other.entries {
            match self.entries.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node.clone());
                }
                Entry::Occupied(mut slot) => match (slot.get_mut(), node) {
                    (Node::Section(base), Node::Section(over)) => base.overlay(over),
                    (existing, _) => *existing = node.clone(),
                },
            }
        }
    }

    /// Removes and returns a top-level entry. Used when flattening scoped
    /// views, where structural sections must not leak into the result.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.remove(key)
    }

    /// Inserts a node under `key`, failing if the key is already taken.
    /// Template parsing uses this to enforce key uniqueness per section.
    pub(crate) fn insert_unique(&mut self, key: &str, node: Node) -> Result<(), ()> {
        if self.entries.contains_key(key) {
            return Err(());
        }
        self.entries.insert(key.to_string(), node);
        Ok(())
    }
}

impl Node {
    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Section(t) => t.entries.values().map(Node::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests;
