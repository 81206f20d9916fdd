//! Default template loading.
//!
//! Templates are XML defaults descriptions shipped per media type (a
//! built-in one for `book`, custom ones via `--template`). They parse into
//! the same [`SettingsTree`] shape as the persisted store so the resolver
//! can merge the two key-for-key.
//!
//! Shape:
//!
//! ```xml
//! <settings>
//!   <section name="TeX">
//!     <entry key="engine" value="xetex"/>
//!     <section name="Margins">...</section>
//!   </section>
//! </settings>
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Node, SettingsTree};
use crate::error::{Error, Result};

/// Loads and parses a template file.
///
/// # Errors
///
/// [`Error::ConfigNotFound`] if the file does not exist,
/// [`Error::ConfigParse`] on malformed XML.
pub fn load_template(path: &Path) -> Result<SettingsTree> {
    if !path.exists() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    let xml = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: format!("read failed: {}", e),
    })?;
    parse(&xml, path)
}

/// Parses a template from a string (used for the built-in templates).
pub fn parse_template(xml: &str) -> Result<SettingsTree> {
    parse(xml, Path::new("<builtin>"))
}

fn parse(xml: &str, path: &Path) -> Result<SettingsTree> {
    let err = |message: String| Error::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut root = SettingsTree::new();
    // Open sections, outermost first. The document element itself is not a
    // section; its children land in `root`.
    let mut stack: Vec<(String, SettingsTree)> = Vec::new();
    let mut saw_document_element = false;
    let mut in_entry = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"section" => {
                    let name = required_attr(e, b"name")
                        .ok_or_else(|| err("<section> without name attribute".into()))?;
                    stack.push((name, SettingsTree::new()));
                }
                b"entry" => {
                    // <entry>...</entry> spelled as a non-empty element.
                    insert_entry(e, stack.last_mut().map(|(_, t)| t).unwrap_or(&mut root))
                        .map_err(err)?;
                    in_entry = true;
                }
                _ if !saw_document_element => {
                    saw_document_element = true;
                }
                other => {
                    return Err(err(format!(
                        "unexpected element <{}>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"entry" => {
                    insert_entry(e, stack.last_mut().map(|(_, t)| t).unwrap_or(&mut root))
                        .map_err(err)?;
                }
                b"section" => {
                    // An empty section is legal (e.g. a Groups placeholder).
                    let name = required_attr(e, b"name")
                        .ok_or_else(|| err("<section> without name attribute".into()))?;
                    let parent = stack.last_mut().map(|(_, t)| t).unwrap_or(&mut root);
                    parent
                        .insert_unique(&name, Node::Section(SettingsTree::new()))
                        .map_err(|_| err(format!("duplicate key '{}'", name)))?;
                }
                other => {
                    return Err(err(format!(
                        "unexpected element <{}/>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"section" => {
                    let (name, tree) = stack
                        .pop()
                        .ok_or_else(|| err("unbalanced </section>".into()))?;
                    let parent = stack.last_mut().map(|(_, t)| t).unwrap_or(&mut root);
                    parent
                        .insert_unique(&name, Node::Section(tree))
                        .map_err(|_| err(format!("duplicate key '{}'", name)))?;
                }
                b"entry" => {
                    in_entry = false;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if !in_entry => {
                let text = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                if !text.is_empty() {
                    return Err(err(format!("unexpected text '{}'", text)));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(err(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(err("unclosed <section>".into()));
    }
    Ok(root)
}

/// Reads an `<entry key=".." value=".."/>` into `target`.
fn insert_entry(e: &BytesStart<'_>, target: &mut SettingsTree) -> std::result::Result<(), String> {
    let key = required_attr(e, b"key").ok_or_else(|| "<entry> without key attribute".to_string())?;
    let value =
        required_attr(e, b"value").ok_or_else(|| format!("<entry key=\"{}\"> without value", key))?;
    target
        .insert_unique(&key, Node::Leaf(value))
        .map_err(|_| format!("duplicate key '{}'", key))
}

fn required_attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
