// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// All sections are optional; the defaults reproduce the conventional
/// layout:
///
/// ```toml
/// [paths]
/// source_root = "source"
/// public_root = "public"
///
/// [serve]
/// port = 8888
/// ws_port = 8080
///
/// [transform.scripts]
/// comments = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Runner behaviour from `[runtime]`.
    #[serde(default)]
    pub runtime: RuntimeSection,

    /// Source/destination layout from `[paths]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Per-transformer option records from `[transform.*]`.
    #[serde(default)]
    pub transform: TransformSection,

    /// Dev server + live reload options from `[serve]`.
    #[serde(default)]
    pub serve: ServeSection,
}

/// Validated configuration.
///
/// Obtained via `TryFrom<RawConfigFile>`; construction is the only place
/// semantic checks run, so holding a `ConfigFile` means the layout and
/// option values are sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runtime: RuntimeSection,
    pub paths: PathsSection,
    pub transform: TransformSection,
    pub serve: ServeSection,
}

impl ConfigFile {
    /// Construct without validation. Only `validate` should call this.
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            runtime: raw.runtime,
            paths: raw.paths,
            transform: raw.transform,
            serve: raw.serve,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[runtime]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSection {
    /// How many follow-up runs can pile up while a run is in flight.
    /// Re-saving a task that is already pending queues another follow-up
    /// run; past this limit the oldest pending runs merge together. The
    /// default of 1 gives plain trailing-edge re-triggering.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    1
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            queue_length: default_queue_length(),
        }
    }
}

/// `[paths]` section: symbolic asset category -> source glob + destination.
///
/// Source globs are relative to `source_root`; destination directories are
/// relative to `public_root`. Compiled templates land at the public root
/// itself.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    #[serde(default = "default_public_root")]
    pub public_root: PathBuf,

    /// Source glob per category, from `[paths.source]`.
    #[serde(default)]
    pub source: SourceGlobs,

    /// Destination directory per category, from `[paths.public]`.
    #[serde(default)]
    pub public: PublicDirs,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("source")
}

fn default_public_root() -> PathBuf {
    PathBuf::from("public")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            public_root: default_public_root(),
            source: SourceGlobs::default(),
            public: PublicDirs::default(),
        }
    }
}

/// `[paths.source]` globs, relative to `source_root`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceGlobs {
    #[serde(default = "default_fonts_glob")]
    pub fonts: String,
    #[serde(default = "default_images_glob")]
    pub images: String,
    #[serde(default = "default_templates_glob")]
    pub templates: String,
    #[serde(default = "default_scripts_glob")]
    pub scripts: String,
    #[serde(default = "default_vendor_glob")]
    pub vendor: String,
    #[serde(default = "default_styles_glob")]
    pub styles: String,
}

fn default_fonts_glob() -> String {
    "fonts/**/*".to_string()
}
fn default_images_glob() -> String {
    "images/*".to_string()
}
fn default_templates_glob() -> String {
    "templates/*.md".to_string()
}
fn default_scripts_glob() -> String {
    "scripts/*.js".to_string()
}
fn default_vendor_glob() -> String {
    "scripts/vendor/*.js".to_string()
}
fn default_styles_glob() -> String {
    "styles/*.css".to_string()
}

impl Default for SourceGlobs {
    fn default() -> Self {
        Self {
            fonts: default_fonts_glob(),
            images: default_images_glob(),
            templates: default_templates_glob(),
            scripts: default_scripts_glob(),
            vendor: default_vendor_glob(),
            styles: default_styles_glob(),
        }
    }
}

/// `[paths.public]` destination directories, relative to `public_root`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicDirs {
    #[serde(default = "default_fonts_dir")]
    pub fonts: PathBuf,
    #[serde(default = "default_images_dir")]
    pub images: PathBuf,
    #[serde(default = "default_scripts_dir")]
    pub scripts: PathBuf,
    #[serde(default = "default_styles_dir")]
    pub styles: PathBuf,
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}
fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}
fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}
fn default_styles_dir() -> PathBuf {
    PathBuf::from("styles")
}

impl Default for PublicDirs {
    fn default() -> Self {
        Self {
            fonts: default_fonts_dir(),
            images: default_images_dir(),
            scripts: default_scripts_dir(),
            styles: default_styles_dir(),
        }
    }
}

/// `[transform.*]` sections: fixed option records handed to the external
/// transformers unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformSection {
    #[serde(default)]
    pub templates: TemplateOptions,
    #[serde(default)]
    pub scripts: ScriptOptions,
    #[serde(default)]
    pub minify: MinifyOptions,
    #[serde(default)]
    pub html: HtmlOptions,
    #[serde(default)]
    pub images: ImageOptions,
}

/// Options for the template compiler (`[transform.templates]`).
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateOptions {
    /// Smart punctuation (curly quotes, dashes).
    #[serde(default = "default_true")]
    pub smart_punctuation: bool,
    /// Table syntax support.
    #[serde(default = "default_true")]
    pub tables: bool,
    /// Footnote syntax support.
    #[serde(default)]
    pub footnotes: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            smart_punctuation: true,
            tables: true,
            footnotes: false,
        }
    }
}

/// Options for the script transpiler (`[transform.scripts]`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptOptions {
    /// Keep comments in the transpiled output.
    #[serde(default)]
    pub comments: bool,
}

/// Options for the JS minifier (`[transform.minify]`).
#[derive(Debug, Clone, Deserialize)]
pub struct MinifyOptions {
    /// Rename variables to shorter identifiers.
    #[serde(default = "default_true")]
    pub mangle: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self { mangle: true }
    }
}

/// Options for the HTML minifier (`[transform.html]`).
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlOptions {
    /// Collapse runs of whitespace between tags to a single space.
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
        }
    }
}

/// Options for the image optimizer (`[transform.images]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ImageOptions {
    /// JPEG re-encode quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// `[serve]` section: dev server + live reload.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Static HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// WebSocket live-reload port.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Inject CSS changes without a full page reload.
    #[serde(default = "default_true")]
    pub inject_changes: bool,

    /// Fixed watch debounce delay in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_port() -> u16 {
    8888
}
fn default_ws_port() -> u16 {
    8080
}
fn default_debounce_ms() -> u64 {
    100
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            ws_port: default_ws_port(),
            inject_changes: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}
