//! Render dispatch for the `folio render` subcommand.
//!
//! Resolves the scope's settings, instantiates the requested type from the
//! registry, and runs it. With a group but no component, every component
//! declared in the group is rendered in turn; per-component failures are
//! collected into the report instead of aborting the batch.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::error::Error;
use crate::project::Project;
use crate::registry::{Category, TypeRegistry};
use crate::report::RenderReport;
use crate::scope::Scope;
use crate::settings::Resolver;

pub(crate) struct RenderArgs {
    pub(crate) category: Category,
    pub(crate) type_name: String,
    pub(crate) project: String,
    pub(crate) group: Option<String>,
    pub(crate) component: Option<String>,
    pub(crate) template: Option<PathBuf>,
    pub(crate) root: Option<PathBuf>,
}

pub(crate) async fn handle_render(args: RenderArgs) -> Result<()> {
    let root = Project::projects_root(args.root)?;
    let project = Project::open(&args.project, args.template.as_deref(), &root)?;
    let registry = TypeRegistry::with_builtins()?;

    // Components render per component; a component-scoped request without a
    // group is not addressable.
    if args.category == Category::Component && args.group.is_none() {
        return Err(Error::MissingRequiredArgument("--group").into());
    }

    let mut scope = Scope::project(args.project.clone());
    if let Some(ref g) = args.group {
        scope = scope.with_group(g.clone());
    }

    let targets: Vec<Scope> = match (&args.group, &args.component) {
        (Some(_), Some(c)) => vec![scope.clone().with_component(c.clone())],
        (Some(g), None) if args.category == Category::Component => {
            let components = project.components(g);
            anyhow::ensure!(
                !components.is_empty(),
                "group '{}' declares no components in project '{}'",
                g,
                args.project
            );
            components
                .into_iter()
                .map(|c| scope.clone().with_component(c))
                .collect()
        }
        // Managers and auxiliaries render once at whatever scope was given.
        _ => vec![scope.clone()],
    };

    println!(
        "{} {} {} for {}",
        "folio".bold().cyan(),
        args.category,
        args.type_name.yellow(),
        scope
    );
    println!();

    let store = Project::store(&project.dir);
    let resolver = Resolver::new(&store, &project.template);

    let mut report = RenderReport::new();
    for target in targets {
        // Resolution repeats per scope so each target sees a current view.
        let settings = resolver.resolve_scope(&target)?;
        // Instantiation errors (unknown type) are fatal; render errors are
        // contained per target.
        let handler = registry.instantiate(args.category, &args.type_name, settings)?;
        let result = handler.render(&target).await;
        report.push(target.to_string(), result);
    }

    report.print();
    let failures = report.failures();
    if failures > 0 {
        anyhow::bail!("{} render target(s) failed", failures);
    }
    Ok(())
}
