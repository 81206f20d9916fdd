//! Placeholder handler types.
//!
//! Most registered types do not perform real work yet; rendering them
//! reports [`RenderResult::NotImplemented`] so batch callers can tell a
//! recognized-but-unimplemented type apart from an unknown one.

use anyhow::Result;

use super::{Category, Handler, HandlerFactory, RenderResult};
use crate::scope::Scope;
use crate::settings::ScopedSettings;

/// Factory for a named type whose render is a placeholder.
pub struct PlaceholderFactory {
    category: Category,
    name: &'static str,
}

impl PlaceholderFactory {
    pub const fn new(category: Category, name: &'static str) -> Self {
        Self { category, name }
    }
}

impl HandlerFactory for PlaceholderFactory {
    fn category(&self) -> Category {
        self.category
    }

    fn type_name(&self) -> &str {
        self.name
    }

    fn create(&self, _settings: ScopedSettings) -> Box<dyn Handler> {
        Box::new(PlaceholderHandler)
    }
}

struct PlaceholderHandler;

#[async_trait::async_trait]
impl Handler for PlaceholderHandler {
    async fn render(self: Box<Self>, _scope: &Scope) -> Result<RenderResult> {
        Ok(RenderResult::NotImplemented)
    }
}
