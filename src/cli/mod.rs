//! Command-line interface definition and dispatch for folio.
//!
//! Uses [`clap`] for argument parsing with derive macros. Render operations
//! live in the [`render`] submodule, settings inspection in [`settings`].

mod render;
pub mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::project::Project;
use crate::registry::{Category, TypeRegistry};

/// Top-level CLI structure for folio.
#[derive(Parser)]
#[command(name = "folio", about = "A project manager for typesetting book publications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the folio CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    New {
        /// Project ID (letters, digits, '_' and '-')
        id: String,
        /// Media type selecting the default template
        #[arg(long, default_value = crate::constants::DEFAULT_MEDIA_TYPE)]
        media_type: String,
        /// Custom template XML instead of the built-in one
        #[arg(long)]
        template: Option<PathBuf>,
        /// Projects root directory (defaults to the XDG data dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// List all projects
    List {
        /// Projects root directory (defaults to the XDG data dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Inspect or change project settings
    Settings {
        #[command(subcommand)]
        action: settings::SettingsAction,
    },
    /// Render a registered type for a scope
    Render {
        /// Registry category of the type
        #[arg(value_enum)]
        category: Category,
        /// Registered type name (e.g. usfmTex)
        type_name: String,
        /// Project ID
        #[arg(short, long)]
        project: String,
        /// Group ID within the project
        #[arg(short, long)]
        group: Option<String>,
        /// Component ID within the group (omit to render the whole group)
        #[arg(short, long)]
        component: Option<String>,
        /// Custom template XML instead of the built-in one
        #[arg(long)]
        template: Option<PathBuf>,
        /// Projects root directory (defaults to the XDG data dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// List registered handler types
    Types {
        /// Only show one category
        #[arg(long, value_enum)]
        category: Option<Category>,
    },
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::New {
            id,
            media_type,
            template,
            root,
        } => {
            let root = Project::projects_root(root)?;
            let project = Project::create(&id, &media_type, template.as_deref(), &root)?;
            println!(
                "{} project {} ({})",
                "created:".green().bold(),
                project.id.cyan(),
                project.dir.display()
            );
            Ok(())
        }
        Commands::List { root } => {
            let root = Project::projects_root(root)?;
            let ids = Project::list(&root)?;
            if ids.is_empty() {
                println!("{}", "No projects found.".dimmed());
                println!("Create one with: {}", "folio new <id>".cyan());
                return Ok(());
            }
            for id in ids {
                println!("{}", id);
            }
            Ok(())
        }
        Commands::Settings { action } => settings::handle_settings(action),
        Commands::Render {
            category,
            type_name,
            project,
            group,
            component,
            template,
            root,
        } => {
            render::handle_render(render::RenderArgs {
                category,
                type_name,
                project,
                group,
                component,
                template,
                root,
            })
            .await
        }
        Commands::Types { category } => {
            let registry = TypeRegistry::with_builtins()?;
            let categories = match category {
                Some(c) => vec![c],
                None => vec![Category::Manager, Category::Component, Category::Auxiliary],
            };
            for category in categories {
                println!("{}", category.to_string().bold());
                for name in registry.type_names(category) {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
    }
}
