//! Project lifecycle for folio.
//!
//! Each project is a directory under the projects root holding one
//! persisted settings file (`project.conf`). Opening a project always runs
//! the resolver, so defaults introduced by a newer template are migrated
//! into the persisted file as a side effect of any read.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::constants::{
    APP_NAME, BOOK_TEMPLATE_XML, DEFAULT_MEDIA_TYPE, KEY_PROJECT_PATH, PROJECT_CONFIG_FILENAME,
};
use crate::error::Error;
use crate::settings::{self, Resolver, SettingsStore, SettingsTree};

/// An opened (or freshly created) project with its resolved settings.
///
/// The template that applies to the project's media type travels with it,
/// so callers can re-run scoped resolution without re-deriving it.
pub struct Project {
    pub id: String,
    pub dir: PathBuf,
    pub settings: SettingsTree,
    pub template: SettingsTree,
}

impl Project {
    /// Returns the projects root directory.
    ///
    /// `--root` overrides; the default is `~/.local/share/folio/projects/`
    /// on Linux (`XDG_DATA_HOME/folio/projects`).
    pub fn projects_root(override_root: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(root) = override_root {
            return Ok(root);
        }
        let dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join(APP_NAME)
            .join("projects");
        Ok(dir)
    }

    /// Creates a new project and materializes its settings file from the
    /// media type's template.
    pub fn create(
        id: &str,
        media_type: &str,
        template_path: Option<&Path>,
        root: &Path,
    ) -> Result<Self> {
        validate_id(id).with_context(|| format!("invalid project ID '{}'", id))?;

        let dir = root.join(id);
        let store = Self::store(&dir);
        anyhow::ensure!(
            !store.exists(),
            "project '{}' already exists at {}",
            id,
            dir.display()
        );

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create project directory {:?}", dir))?;
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve project directory {:?}", dir))?;

        // Stamp project identity into the template before materializing, so
        // the persisted file is complete from its first write.
        let mut template = load_media_template(media_type, template_path)?;
        template.set("Project.id", id);
        template.set("Project.mediaType", media_type);
        template.set("Project.created", Utc::now().to_rfc3339());
        template.set(KEY_PROJECT_PATH, dir.display().to_string());

        let store = Self::store(&dir);
        let settings = Resolver::new(&store, &template).resolve()?;
        Ok(Self {
            id: id.to_string(),
            dir,
            settings,
            template,
        })
    }

    /// Opens an existing project, migrating any newly introduced template
    /// defaults into its persisted file.
    pub fn open(id: &str, template_path: Option<&Path>, root: &Path) -> Result<Self> {
        let dir = root.join(id);
        let store = Self::store(&dir);
        if !store.exists() {
            return Err(Error::ConfigNotFound(store.path().to_path_buf()))
                .with_context(|| format!("project '{}' not found under {}", id, root.display()));
        }

        // The media type decides which template applies; read it from the
        // persisted file before resolving.
        let raw = store.load()?;
        let media_type = raw
            .get("Project.mediaType")
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        let template = load_media_template(&media_type, template_path)?;

        let settings = Resolver::new(&store, &template).resolve()?;
        Ok(Self {
            id: id.to_string(),
            dir,
            settings,
            template,
        })
    }

    /// Lists project IDs under the projects root, sorted.
    pub fn list(root: &Path) -> Result<Vec<String>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(root)
            .with_context(|| format!("Failed to read projects root {:?}", root))?
        {
            let entry = entry?;
            if entry.path().join(PROJECT_CONFIG_FILENAME).exists() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// The settings store backing this project.
    pub fn store(dir: &Path) -> SettingsStore {
        SettingsStore::new(dir.join(PROJECT_CONFIG_FILENAME))
    }

    /// Component IDs declared under `Groups.<group>.Components`, sorted.
    pub fn components(&self, group: &str) -> Vec<&str> {
        self.settings
            .section(&format!("Groups.{}.Components", group))
            .map(|s| s.section_names())
            .unwrap_or_default()
    }

    /// Sets a leaf value in the persisted file, under the store lock.
    pub fn set_value(&mut self, path: &str, value: &str) -> Result<()> {
        let store = Self::store(&self.dir);
        let _lock = store.lock()?;
        let mut tree = store.load()?;
        tree.set(path, value);
        store.save(&tree)?;
        self.settings = tree;
        Ok(())
    }
}

/// Loads the template for a media type: an explicit `--template` path wins,
/// otherwise the built-in template for the type.
fn load_media_template(media_type: &str, template_path: Option<&Path>) -> Result<SettingsTree> {
    if let Some(path) = template_path {
        return Ok(settings::load_template(path)?);
    }
    match media_type {
        DEFAULT_MEDIA_TYPE => Ok(settings::parse_template(BOOK_TEMPLATE_XML)?),
        other => anyhow::bail!(
            "no built-in template for media type '{}'; pass --template",
            other
        ),
    }
}

/// Project, group, and component IDs end up in key paths and directory
/// names; keep them to a conservative character set.
fn validate_id(id: &str) -> Result<()> {
    anyhow::ensure!(!id.is_empty(), "ID must not be empty");
    anyhow::ensure!(
        id.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        "ID may only contain letters, digits, '_' and '-'"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_open_round_trips() {
        let root = tempdir().unwrap();
        let project = Project::create("kjv", "book", None, root.path()).unwrap();
        assert_eq!(project.settings.get("Project.id"), Some("kjv"));
        assert_eq!(project.settings.get("Project.mediaType"), Some("book"));
        assert_eq!(project.settings.get("TeX.engine"), Some("xetex"));

        let reopened = Project::open("kjv", None, root.path()).unwrap();
        assert_eq!(reopened.settings, project.settings);
    }

    #[test]
    fn create_twice_fails() {
        let root = tempdir().unwrap();
        Project::create("kjv", "book", None, root.path()).unwrap();
        assert!(Project::create("kjv", "book", None, root.path()).is_err());
    }

    #[test]
    fn open_missing_project_fails() {
        let root = tempdir().unwrap();
        assert!(Project::open("nope", None, root.path()).is_err());
    }

    #[test]
    fn rejects_bad_ids() {
        let root = tempdir().unwrap();
        assert!(Project::create("a.b", "book", None, root.path()).is_err());
        assert!(Project::create("", "book", None, root.path()).is_err());
    }

    #[test]
    fn components_listed_from_group_section() {
        let root = tempdir().unwrap();
        let mut project = Project::create("kjv", "book", None, root.path()).unwrap();
        project
            .set_value("Groups.nt.Components.mat.Format.fontSizeUnit", "0.9")
            .unwrap();
        project
            .set_value("Groups.nt.Components.mrk.Format.fontSizeUnit", "0.9")
            .unwrap();
        assert_eq!(project.components("nt"), vec!["mat", "mrk"]);
        assert!(project.components("ot").is_empty());
    }
}
