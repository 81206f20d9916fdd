//! Effective-settings resolution.
//!
//! The resolver owns the merge-and-persist semantics: a project touched for
//! the first time gets a verbatim copy of its template; an existing project
//! gains any defaults the template introduced since it was written, without
//! ever overwriting a persisted value. Keys the template no longer carries
//! are left untouched; there is no pruning.

use anyhow::Context;

use super::{SettingsStore, SettingsTree};
use crate::error::{Error, Result};
use crate::scope::Scope;

/// Computes effective settings for one persisted store against one template.
pub struct Resolver<'a> {
    store: &'a SettingsStore,
    template: &'a SettingsTree,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a SettingsStore, template: &'a SettingsTree) -> Self {
        Self { store, template }
    }

    /// Resolves the project-level settings tree.
    ///
    /// Holds the store's advisory lock across the whole read-merge-write
    /// cycle. Writes back only when something changed, so resolving twice
    /// in a row leaves the file byte-identical.
    pub fn resolve(&self) -> Result<SettingsTree> {
        let _lock = self.store.lock()?;
        match self.store.load() {
            Ok(mut tree) => {
                let inserted = tree.merge_missing(self.template);
                if inserted > 0 {
                    self.store.save(&tree)?;
                }
                Ok(tree)
            }
            Err(Error::ConfigNotFound(_)) => {
                let tree = self.template.clone();
                self.store.save(&tree)?;
                Ok(tree)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves settings scoped to a (project, group, component) triple.
    pub fn resolve_scope(&self, scope: &Scope) -> Result<ScopedSettings> {
        let tree = self.resolve()?;
        Ok(ScopedSettings::new(tree, scope.clone()))
    }
}

/// An ordered sequence of settings layers, most-general first.
/// Lookups take the most specific non-absent value for a key path.
pub struct OverrideChain<'a> {
    layers: Vec<&'a SettingsTree>,
}

impl<'a> OverrideChain<'a> {
    pub fn new(layers: Vec<&'a SettingsTree>) -> Self {
        Self { layers }
    }

    /// Most specific non-absent value for `path`.
    pub fn get(&self, path: &str) -> Option<&'a str> {
        self.layers.iter().rev().find_map(|t| t.get(path))
    }

    /// Flattens the chain into a single tree, most specific wins.
    pub fn flatten(&self) -> SettingsTree {
        let mut out = SettingsTree::new();
        for layer in &self.layers {
            out.overlay(layer);
        }
        out
    }
}

/// The resolved project tree viewed through a scope.
///
/// Group overrides live in the `Groups.<id>` section of the project tree,
/// component overrides in `Groups.<id>.Components.<id>`. Both mirror the
/// top-level section layout (a group's `Format` section overrides the
/// project's `Format` section, and so on).
pub struct ScopedSettings {
    project: SettingsTree,
    scope: Scope,
}

impl ScopedSettings {
    pub fn new(project: SettingsTree, scope: Scope) -> Self {
        Self { project, scope }
    }

    /// Override layers for this scope, most-general first.
    fn chain(&self) -> OverrideChain<'_> {
        let mut layers = vec![&self.project];
        if let Some(group) = self
            .scope
            .group
            .as_ref()
            .and_then(|g| self.project.section(&format!("Groups.{}", g)))
        {
            layers.push(group);
            if let Some(component) = self
                .scope
                .component
                .as_ref()
                .and_then(|c| group.section(&format!("Components.{}", c)))
            {
                layers.push(component);
            }
        }
        OverrideChain::new(layers)
    }

    /// Most specific value for a dotted key path, or `None`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.chain().get(path)
    }

    /// Like [`get`](Self::get) but the key must be present.
    pub fn require(&self, path: &str) -> anyhow::Result<&str> {
        self.get(path)
            .with_context(|| format!("missing required setting '{}' for scope {}", path, self.scope))
    }

    /// Typed accessor: parse the value at `path` as u64, if present.
    pub fn u64(&self, path: &str) -> anyhow::Result<Option<u64>> {
        self.get(path)
            .map(|v| {
                v.parse()
                    .with_context(|| format!("setting '{}' is not an integer: '{}'", path, v))
            })
            .transpose()
    }

    /// Flattened effective tree for this scope.
    ///
    /// The structural `Groups` / `Components` sections are stripped; what
    /// remains is what a handler actually sees after overrides apply.
    pub fn effective(&self) -> SettingsTree {
        let mut out = self.chain().flatten();
        out.remove("Groups");
        out.remove("Components");
        out
    }
}
