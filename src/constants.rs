//! Centralized constants for folio.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "folio";

/// Persisted per-project settings filename.
pub const PROJECT_CONFIG_FILENAME: &str = "project.conf";

/// Sidecar lock filename guarding the persisted settings file.
pub const PROJECT_LOCK_FILENAME: &str = ".project.conf.lock";

/// Default media type when `--media-type` is not given.
pub const DEFAULT_MEDIA_TYPE: &str = "book";

// --- TeX invocation ---

/// Default TeX engine binary when `TeX.engine` is not configured.
pub const DEFAULT_TEX_ENGINE: &str = "xetex";

/// Default timeout for a single engine invocation, in seconds.
pub const TEX_DEFAULT_TIMEOUT_SECS: u64 = 120;

// --- Settings key paths ---

/// Settings key holding the TeX engine binary name.
pub const KEY_TEX_ENGINE: &str = "TeX.engine";

/// Settings key holding the engine timeout in seconds (stored as text).
pub const KEY_TEX_TIMEOUT: &str = "TeX.timeoutSeconds";

/// Settings key holding the project's on-disk directory.
pub const KEY_PROJECT_PATH: &str = "Project.path";

/// Built-in default template for the `book` media type.
///
/// Sections nest; every entry value is text. Custom templates with the same
/// shape can be supplied with `--template`.
pub const BOOK_TEMPLATE_XML: &str = r#"<settings>
  <section name="Project">
    <entry key="mediaType" value="book"/>
    <entry key="language" value="en"/>
    <entry key="script" value="Latn"/>
  </section>
  <section name="TeX">
    <entry key="engine" value="xetex"/>
    <entry key="timeoutSeconds" value="120"/>
  </section>
  <section name="Format">
    <entry key="pageWidth" value="148mm"/>
    <entry key="pageHeight" value="210mm"/>
    <entry key="fontSizeUnit" value="0.8"/>
    <entry key="lineSpacingFactor" value="1.1"/>
    <section name="Columns">
      <entry key="count" value="2"/>
      <entry key="gutter" value="12pt"/>
    </section>
  </section>
  <section name="Groups">
  </section>
</settings>
"#;
