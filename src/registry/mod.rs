//! Handler type registry.
//!
//! Every renderable thing in folio — managers, components, auxiliary types —
//! is a [`Handler`] selected from this registry by (category, type name).
//! The registry is an explicit object built at startup and passed by
//! reference to call sites; there is no ambient global state.

pub mod placeholders;
pub mod usfm_tex;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;

use crate::error::Error;
use crate::scope::Scope;
use crate::settings::ScopedSettings;

use placeholders::PlaceholderFactory;
use usfm_tex::UsfmTexFactory;

/// Registry category. Type names are unique within a category, not across
/// categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    /// Project-wide concerns (fonts, styles, page layout, hyphenation).
    Manager,
    /// Renderable document pieces (scripture text, maps, tables of contents).
    Component,
    /// Support types that neither manage nor render documents.
    Auxiliary,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Manager => "manager",
            Category::Component => "component",
            Category::Auxiliary => "auxiliary",
        };
        f.write_str(s)
    }
}

/// Outcome of a render attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// The external engine ran and exited 0.
    Success,
    /// The type is registered but its render is a placeholder.
    NotImplemented,
    /// The external engine failed, timed out, or could not be started.
    /// `code` is absent when there is no exit status (spawn failure, timeout).
    ExternalToolFailure { code: Option<i32>, stderr: String },
}

/// An instantiated registry entry, bound to its resolved settings.
///
/// Construction is the Configured state; `render` consumes the handler, so
/// each instance makes exactly one attempt. Callers construct a new handler
/// per attempt.
#[async_trait::async_trait]
pub trait Handler: Send {
    /// Performs one render attempt for `scope`.
    ///
    /// Returns `Err` only for configuration problems (missing settings,
    /// unparseable values); tool-level failures are reported inside
    /// [`RenderResult`] so batch callers can keep going.
    async fn render(self: Box<Self>, scope: &Scope) -> Result<RenderResult>;
}

/// Constructs handlers of one registered type.
pub trait HandlerFactory: Send + Sync {
    fn category(&self) -> Category;

    /// Unique name within the factory's category.
    fn type_name(&self) -> &str;

    /// Builds a handler bound to the given resolved settings.
    fn create(&self, settings: ScopedSettings) -> Box<dyn Handler>;
}

/// Holds all registered handler factories and dispatches by name.
pub struct TypeRegistry {
    entries: Vec<Arc<dyn HandlerFactory>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a factory. Called during startup.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateType`] if the (category, name) pair is taken.
    pub fn register(&mut self, factory: Box<dyn HandlerFactory>) -> Result<(), Error> {
        if self
            .entries
            .iter()
            .any(|f| f.category() == factory.category() && f.type_name() == factory.type_name())
        {
            return Err(Error::DuplicateType {
                category: factory.category(),
                name: factory.type_name().to_string(),
            });
        }
        self.entries.push(Arc::from(factory));
        Ok(())
    }

    /// Looks up a factory by category and type name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownType`] if nothing matches — never a silent fallback.
    pub fn resolve(&self, category: Category, name: &str) -> Result<Arc<dyn HandlerFactory>, Error> {
        self.entries
            .iter()
            .find(|f| f.category() == category && f.type_name() == name)
            .cloned()
            .ok_or_else(|| Error::UnknownType {
                category,
                name: name.to_string(),
            })
    }

    /// Resolves a factory and builds a handler bound to `settings`.
    pub fn instantiate(
        &self,
        category: Category,
        name: &str,
        settings: ScopedSettings,
    ) -> Result<Box<dyn Handler>, Error> {
        Ok(self.resolve(category, name)?.create(settings))
    }

    /// Registered type names for one category, in registration order.
    pub fn type_names(&self, category: Category) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|f| f.category() == category)
            .map(|f| f.type_name())
            .collect()
    }

    /// How many types are registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl TypeRegistry {
    /// Creates a registry with all built-in types.
    ///
    /// `usfmTex` is the one component that performs real work; the rest
    /// are placeholders that render to [`RenderResult::NotImplemented`],
    /// matching the breadth of types the manager recognizes.
    pub fn with_builtins() -> Result<Self, Error> {
        let mut registry = Self::new();
        registry.register(Box::new(UsfmTexFactory))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Component, "map")))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Component, "toc")))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Manager, "fontTex")))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Manager, "styleTex")))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Manager, "layoutTex")))?;
        registry.register(Box::new(PlaceholderFactory::new(Category::Manager, "hyphenTex")))?;
        registry.register(Box::new(PlaceholderFactory::new(
            Category::Auxiliary,
            "diagnose",
        )))?;
        Ok(registry)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
