//! Scope addressing for folio.
//!
//! A scope is the (project, group, component) triple that selects which
//! configuration layers and which registry entry apply to an operation.
//! Group and component are optional; a bare project ID is a valid scope.

use std::fmt;

use crate::error::{Error, Result};

/// The (project, group, component) addressing triple.
///
/// The project ID is never absent. Group and component narrow the scope;
/// an absent element means the operation applies at the wider level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub project: String,
    pub group: Option<String>,
    pub component: Option<String>,
}

impl Scope {
    /// Project-level scope.
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            group: None,
            component: None,
        }
    }

    /// Narrow this scope to a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Narrow this scope to a component. The group must already be set when
    /// the scope is used for component-level resolution.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Returns the group ID, failing if this scope has none.
    ///
    /// Component-level operations require a group; a component without a
    /// group is not addressable.
    pub fn require_group(&self) -> Result<&str> {
        self.group
            .as_deref()
            .ok_or(Error::MissingRequiredArgument("--group"))
    }

    /// Returns the component ID, failing if this scope has none.
    pub fn require_component(&self) -> Result<&str> {
        self.component
            .as_deref()
            .ok_or(Error::MissingRequiredArgument("--component"))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.project)?;
        if let Some(ref g) = self.group {
            write!(f, "/{}", g)?;
            if let Some(ref c) = self.component {
                write!(f, "/{}", c)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let s = Scope::project("kjv");
        assert_eq!(s.to_string(), "kjv");
        let s = s.with_group("nt");
        assert_eq!(s.to_string(), "kjv/nt");
        let s = s.with_component("mat");
        assert_eq!(s.to_string(), "kjv/nt/mat");
    }

    #[test]
    fn require_group_errors_when_absent() {
        let s = Scope::project("kjv");
        assert!(matches!(
            s.require_group(),
            Err(Error::MissingRequiredArgument("--group"))
        ));
    }
}
