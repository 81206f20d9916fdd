use super::*;
use crate::error::Error;
use crate::scope::Scope;
use std::fs;
use tempfile::tempdir;

fn tree(pairs: &[(&str, &str)]) -> SettingsTree {
    let mut t = SettingsTree::new();
    for (k, v) in pairs {
        t.set(k, *v);
    }
    t
}

#[test]
fn get_and_set_dotted_paths() {
    let mut t = SettingsTree::new();
    t.set("TeX.engine", "xetex");
    t.set("TeX.Margins.top", "12mm");
    assert_eq!(t.get("TeX.engine"), Some("xetex"));
    assert_eq!(t.get("TeX.Margins.top"), Some("12mm"));
    assert_eq!(t.get("TeX.missing"), None);
    assert!(t.section("TeX.Margins").is_some());
    // A section is not a leaf and vice versa.
    assert_eq!(t.get("TeX"), None);
    assert!(t.section("TeX.engine").is_none());
}

#[test]
fn merge_missing_adds_only_absent_keys() {
    let template = tree(&[("Section.A", "1"), ("Section.B", "2")]);
    let mut persisted = tree(&[("Section.A", "9")]);

    let inserted = persisted.merge_missing(&template);
    assert_eq!(inserted, 1);
    assert_eq!(persisted.get("Section.A"), Some("9"));
    assert_eq!(persisted.get("Section.B"), Some("2"));

    // Idempotent: a second merge inserts nothing.
    assert_eq!(persisted.merge_missing(&template), 0);
}

#[test]
fn merge_missing_keeps_stale_keys() {
    // Key present in the persisted tree but removed from a newer template
    // is left untouched (no pruning).
    let template = tree(&[("Section.A", "1")]);
    let mut persisted = tree(&[("Section.A", "9"), ("Section.old", "keep")]);
    persisted.merge_missing(&template);
    assert_eq!(persisted.get("Section.old"), Some("keep"));
}

#[test]
fn overlay_most_specific_wins() {
    let mut base = tree(&[("Format.size", "10"), ("Format.font", "serif")]);
    let over = tree(&[("Format.size", "12")]);
    base.overlay(&over);
    assert_eq!(base.get("Format.size"), Some("12"));
    assert_eq!(base.get("Format.font"), Some("serif"));
}

// --- template parsing ---

#[test]
fn parses_nested_sections_and_entries() {
    let xml = r#"<settings>
        <section name="TeX">
            <entry key="engine" value="xetex"/>
            <section name="Margins">
                <entry key="top" value="12mm"/>
            </section>
        </section>
        <section name="Groups"></section>
    </settings>"#;
    let t = parse_template(xml).unwrap();
    assert_eq!(t.get("TeX.engine"), Some("xetex"));
    assert_eq!(t.get("TeX.Margins.top"), Some("12mm"));
    assert!(t.section("Groups").is_some());
}

#[test]
fn builtin_book_template_parses() {
    let t = parse_template(crate::constants::BOOK_TEMPLATE_XML).unwrap();
    assert_eq!(t.get("TeX.engine"), Some("xetex"));
    assert_eq!(t.get("Project.mediaType"), Some("book"));
    assert!(t.section("Groups").is_some());
}

#[test]
fn rejects_duplicate_keys() {
    let xml = r#"<s><section name="A"><entry key="k" value="1"/><entry key="k" value="2"/></section></s>"#;
    assert!(matches!(parse_template(xml), Err(Error::ConfigParse { .. })));
}

#[test]
fn rejects_entry_without_value() {
    let xml = r#"<s><section name="A"><entry key="k"/></section></s>"#;
    assert!(matches!(parse_template(xml), Err(Error::ConfigParse { .. })));
}

#[test]
fn rejects_malformed_xml() {
    let xml = r#"<s><section name="A">"#;
    assert!(matches!(parse_template(xml), Err(Error::ConfigParse { .. })));
}

#[test]
fn rejects_stray_text() {
    let xml = r#"<s><section name="A">words</section></s>"#;
    assert!(matches!(parse_template(xml), Err(Error::ConfigParse { .. })));
}

#[test]
fn load_template_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.xml");
    assert!(matches!(
        load_template(&missing),
        Err(Error::ConfigNotFound(_))
    ));
}

// --- store ---

#[test]
fn store_load_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("project.conf"));
    assert!(matches!(store.load(), Err(Error::ConfigNotFound(_))));
}

#[test]
fn store_round_trips() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("project.conf"));
    let t = tree(&[("Project.id", "kjv"), ("TeX.engine", "xetex")]);
    store.save(&t).unwrap();
    assert_eq!(store.load().unwrap(), t);
    // No temp file left behind after the atomic rename.
    assert!(!dir.path().join("project.conf.tmp").exists());
}

#[test]
fn store_rejects_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.conf");
    fs::write(&path, "not = [valid").unwrap();
    let store = SettingsStore::new(path);
    assert!(matches!(store.load(), Err(Error::ConfigParse { .. })));
}

// --- resolver ---

#[test]
fn resolve_materializes_template_on_first_touch() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("project.conf"));
    let template = tree(&[("Section.A", "1"), ("Section.B", "2")]);

    let resolved = Resolver::new(&store, &template).resolve().unwrap();
    assert_eq!(resolved, template);
    // The persisted file round-trips to the template.
    assert_eq!(store.load().unwrap(), template);
}

#[test]
fn resolve_migrates_new_defaults_persisted_wins() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("project.conf"));
    store.save(&tree(&[("Section.A", "9")])).unwrap();

    let template = tree(&[("Section.A", "1"), ("Section.B", "2")]);
    let resolved = Resolver::new(&store, &template).resolve().unwrap();
    assert_eq!(resolved.get("Section.A"), Some("9"));
    assert_eq!(resolved.get("Section.B"), Some("2"));
    // The migration was persisted.
    assert_eq!(store.load().unwrap().get("Section.B"), Some("2"));
}

#[test]
fn resolve_twice_is_byte_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.conf");
    let store = SettingsStore::new(path.clone());
    store.save(&tree(&[("Section.A", "9")])).unwrap();

    let template = tree(&[("Section.A", "1"), ("Section.B", "2")]);
    let resolver = Resolver::new(&store, &template);
    resolver.resolve().unwrap();
    let first = fs::read(&path).unwrap();
    resolver.resolve().unwrap();
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn resolve_propagates_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.conf");
    fs::write(&path, "broken = [").unwrap();
    let store = SettingsStore::new(path);
    let template = SettingsTree::new();
    assert!(matches!(
        Resolver::new(&store, &template).resolve(),
        Err(Error::ConfigParse { .. })
    ));
}

// --- scoped resolution ---

fn scoped_fixture() -> ScopedSettings {
    let mut project = tree(&[("Format.size", "10"), ("Format.font", "serif")]);
    project.set("Groups.nt.Format.size", "11");
    project.set("Groups.nt.Components.mat.Format.size", "12");
    let scope = Scope::project("kjv").with_group("nt").with_component("mat");
    ScopedSettings::new(project, scope)
}

#[test]
fn override_chain_most_specific_wins() {
    let scoped = scoped_fixture();
    // Component overrides group overrides project.
    assert_eq!(scoped.get("Format.size"), Some("12"));
    // Absent at narrower scopes falls back to the project value.
    assert_eq!(scoped.get("Format.font"), Some("serif"));
}

#[test]
fn group_scope_without_component_override() {
    let mut project = tree(&[("Format.size", "10")]);
    project.set("Groups.nt.Format.size", "11");
    let scope = Scope::project("kjv").with_group("nt").with_component("mat");
    let scoped = ScopedSettings::new(project, scope);
    // No component override: the group value applies.
    assert_eq!(scoped.get("Format.size"), Some("11"));
}

#[test]
fn effective_flattens_and_strips_structure() {
    let effective = scoped_fixture().effective();
    assert_eq!(effective.get("Format.size"), Some("12"));
    assert_eq!(effective.get("Format.font"), Some("serif"));
    assert!(effective.section("Groups").is_none());
}

#[test]
fn typed_accessors() {
    let project = tree(&[("TeX.timeoutSeconds", "120"), ("TeX.bad", "twelve")]);
    let scoped = ScopedSettings::new(project, Scope::project("kjv"));
    assert_eq!(scoped.u64("TeX.timeoutSeconds").unwrap(), Some(120));
    assert_eq!(scoped.u64("TeX.missing").unwrap(), None);
    assert!(scoped.u64("TeX.bad").is_err());
    assert!(scoped.require("TeX.missing").is_err());
}

#[test]
fn resolve_scope_sees_group_overrides() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("project.conf"));
    let mut persisted = tree(&[("Format.size", "10")]);
    persisted.set("Groups.nt.Format.size", "11");
    store.save(&persisted).unwrap();

    let template = tree(&[("Format.size", "10")]);
    let scope = Scope::project("kjv").with_group("nt");
    let scoped = Resolver::new(&store, &template)
        .resolve_scope(&scope)
        .unwrap();
    assert_eq!(scoped.get("Format.size"), Some("11"));
}
