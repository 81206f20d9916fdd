//! Settings inspection and mutation through the `folio settings` subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::project::Project;
use crate::scope::Scope;
use crate::settings::Resolver;

/// Subcommands for the `settings` command.
#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show settings for a scope
    Show {
        /// Project ID
        #[arg(short, long)]
        project: String,
        /// Group ID within the project
        #[arg(short, long)]
        group: Option<String>,
        /// Component ID within the group
        #[arg(short, long)]
        component: Option<String>,
        /// Show the flattened effective tree after overrides apply
        #[arg(long)]
        effective: bool,
        /// Custom template XML instead of the built-in one
        #[arg(long)]
        template: Option<PathBuf>,
        /// Projects root directory (defaults to the XDG data dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Set a settings value for a scope
    Set {
        /// Project ID
        #[arg(short, long)]
        project: String,
        /// Group ID within the project
        #[arg(short, long)]
        group: Option<String>,
        /// Component ID within the group
        #[arg(short, long)]
        component: Option<String>,
        /// Dotted key path (e.g. TeX.engine)
        key: String,
        /// Value to store (always text)
        value: String,
        /// Custom template XML instead of the built-in one
        #[arg(long)]
        template: Option<PathBuf>,
        /// Projects root directory (defaults to the XDG data dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

pub(crate) fn handle_settings(action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show {
            project,
            group,
            component,
            effective,
            template,
            root,
        } => {
            let root = Project::projects_root(root)?;
            let opened = Project::open(&project, template.as_deref(), &root)?;
            let scope = build_scope(&project, group, component)?;

            let store = Project::store(&opened.dir);
            println!("{} {}", "Settings path:".bold(), store.path().display());
            println!("{} {}", "Scope:".bold(), scope);
            println!();

            let tree = if effective || scope.group.is_some() {
                Resolver::new(&store, &opened.template)
                    .resolve_scope(&scope)?
                    .effective()
            } else {
                opened.settings
            };
            print!("{}", toml::to_string(&tree)?);
            Ok(())
        }
        SettingsAction::Set {
            project,
            group,
            component,
            key,
            value,
            template,
            root,
        } => {
            let root = Project::projects_root(root)?;
            let mut opened = Project::open(&project, template.as_deref(), &root)?;
            let scope = build_scope(&project, group, component)?;

            // Group/component scopes write under their override sections.
            let path = match (&scope.group, &scope.component) {
                (Some(g), Some(c)) => format!("Groups.{}.Components.{}.{}", g, c, key),
                (Some(g), None) => format!("Groups.{}.{}", g, key),
                (None, _) => key.clone(),
            };
            opened.set_value(&path, &value)?;
            println!("{} {} = {} ({})", "set:".green().bold(), key, value, scope);
            Ok(())
        }
    }
}

/// Builds the scope triple, rejecting a component without a group.
fn build_scope(project: &str, group: Option<String>, component: Option<String>) -> Result<Scope> {
    let mut scope = Scope::project(project);
    match (group, component) {
        (Some(g), Some(c)) => {
            scope = scope.with_group(g).with_component(c);
        }
        (Some(g), None) => {
            scope = scope.with_group(g);
        }
        (None, Some(_)) => {
            return Err(crate::error::Error::MissingRequiredArgument("--group").into());
        }
        (None, None) => {}
    }
    Ok(scope)
}
