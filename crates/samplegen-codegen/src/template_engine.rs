//! Template engine for sample generation using Handlebars.
//!
//! The engine is strict about undefined variables, never HTML-escapes, and
//! comes preloaded with the text helpers from [`crate::helpers`]. Templates
//! are loaded from a directory: every `*.hbs` file is registered under its
//! relative path without the extension, so `python/sample.hbs` becomes
//! `python/sample`.
//!
//! # Examples
//!
//! ```
//! use samplegen_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new();
//! engine.register_template_string("greeting", "def {{snake_case name}}(): ...")?;
//! let out = engine.render("greeting", &json!({"name": "GetBook"}))?;
//! assert_eq!(out, "def get_book(): ...");
//! # Ok::<(), samplegen_core::Error>(())
//! ```

use crate::helpers::register_text_helpers;
use handlebars::{Handlebars, HelperDef};
use samplegen_core::{Error, Result};
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// File extension of loadable templates.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Template engine for sample generation.
///
/// Built once at startup and shared by reference with every generation
/// call; rendering never mutates it.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates an engine with the text helpers and no templates.
    #[must_use]
    pub fn new() -> Self {
        let mut engine = Self::bare();
        register_text_helpers(&mut engine.handlebars);
        engine
    }

    /// Creates an engine with no helpers and no templates.
    ///
    /// Use this to inject a custom helper set through
    /// [`TemplateEngine::register_helper`].
    #[must_use]
    pub fn bare() -> Self {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        // Samples are source code, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Creates an engine with the text helpers and every template under
    /// `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputError` if the directory cannot be walked or a
    /// template file cannot be read, and `Error::TemplateError` if a
    /// template does not parse.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut engine = Self::new();
        engine.load_directory(dir)?;
        Ok(engine)
    }

    /// Registers every `*.hbs` file under `dir`, returning how many were
    /// loaded.
    ///
    /// Files are visited in file-name order, so the set of registered
    /// templates does not depend on directory iteration order.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateEngine::from_directory`].
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(Error::InputError {
                path: dir.to_path_buf(),
                message: "template directory does not exist".to_string(),
                source: None,
            });
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::InputError {
                path: e.path().unwrap_or(dir).to_path_buf(),
                message: "failed to walk template directory".to_string(),
                source: Some(Box::new(e)),
            })?;

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }

            let Some(name) = template_name(dir, path) else {
                continue;
            };

            let content = std::fs::read_to_string(path).map_err(|e| Error::InputError {
                path: path.to_path_buf(),
                message: "failed to read template".to_string(),
                source: Some(Box::new(e)),
            })?;

            self.register_template_string(&name, &content)?;
            tracing::debug!(template = %name, path = %path.display(), "registered template");
            loaded += 1;
        }

        tracing::info!(count = loaded, dir = %dir.display(), "loaded templates");
        Ok(loaded)
    }

    /// Registers a template from a string.
    ///
    /// Registering an existing name replaces the template.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if the template does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_codegen::template_engine::TemplateEngine;
    ///
    /// let mut engine = TemplateEngine::new();
    /// assert!(engine.register_template_string("broken", "{{name").is_err());
    /// ```
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                template: name.to_string(),
                sample: None,
                message: format!("failed to parse template: {e}"),
            })
    }

    /// Registers a helper, replacing any helper with the same name.
    pub fn register_helper(&mut self, name: &str, helper: Box<dyn HelperDef + Send + Sync + 'a>) {
        self.handlebars.register_helper(name, helper);
    }

    /// Checks if a template is registered.
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Names of every registered template, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .handlebars
            .get_templates()
            .keys()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateError` if the template is not registered,
    /// references an undefined variable, or calls an unknown helper.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        if !self.has_template(template_name) {
            return Err(Error::TemplateError {
                template: template_name.to_string(),
                sample: None,
                message: "template not found".to_string(),
            });
        }

        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                template: template_name.to_string(),
                sample: None,
                message: e.to_string(),
            })
    }
}

impl Default for TemplateEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry name for a template file: relative path, `/`-separated, without
/// the extension.
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    // ========================================================================
    // Directory Loading Tests
    // ========================================================================

    #[test]
    fn test_load_directory_names() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sample.hbs", "{{id}}");
        write(dir.path(), "python/call.hbs", "call");
        write(dir.path(), "README.md", "not a template");

        let engine = TemplateEngine::from_directory(dir.path()).unwrap();
        assert_eq!(engine.template_names(), vec!["python/call", "sample"]);
        assert!(engine.has_template("sample"));
        assert!(!engine.has_template("README"));
    }

    #[test]
    fn test_load_missing_directory() {
        let err = TemplateEngine::from_directory(Path::new("/nonexistent/templates")).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_directory_with_broken_template() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sample.hbs", "{{#if x}}unclosed");

        let err = TemplateEngine::from_directory(dir.path()).unwrap_err();
        assert!(err.is_template_error());
        assert!(err.to_string().contains("sample"));
    }

    #[test]
    fn test_templates_usable_as_partials() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sample.hbs", "[{{> call}}]");
        write(dir.path(), "call.hbs", "{{rpc}}()");

        let engine = TemplateEngine::from_directory(dir.path()).unwrap();
        let out = engine.render("sample", &json!({"rpc": "get_book"})).unwrap();
        assert_eq!(out, "[get_book()]");
    }

    // ========================================================================
    // Rendering Tests
    // ========================================================================

    #[test]
    fn test_strict_mode_fails_on_missing_variable() {
        let mut engine = TemplateEngine::new();
        engine
            .register_template_string("strict", "Value: {{missing_var}}")
            .unwrap();

        let err = engine.render("strict", &json!({"other": 1})).unwrap_err();
        assert!(err.is_template_error());
    }

    #[test]
    fn test_no_html_escaping() {
        let mut engine = TemplateEngine::new();
        engine
            .register_template_string("code", "if a < b && c > d: print('{{s}}')")
            .unwrap();

        let out = engine.render("code", &json!({"s": "<\"&'>"})).unwrap();
        assert_eq!(out, "if a < b && c > d: print('<\"&'>')");
    }

    #[test]
    fn test_unknown_helper_fails() {
        let mut engine = TemplateEngine::new();
        engine
            .register_template_string("bad_helper", "{{nonexistent_helper name}}")
            .unwrap();

        let result = engine.render("bad_helper", &json!({"name": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_render_missing_template() {
        let engine = TemplateEngine::new();
        let err = engine.render("nope", &json!({})).unwrap_err();
        assert!(err.is_template_error());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_bare_engine_has_no_helpers() {
        let mut engine = TemplateEngine::bare();
        engine
            .register_template_string("t", "{{snake_case name}}")
            .unwrap();
        assert!(engine.render("t", &json!({"name": "GetBook"})).is_err());
    }

    fn shout(
        h: &handlebars::Helper<'_>,
        _: &Handlebars<'_>,
        _: &handlebars::Context,
        _: &mut handlebars::RenderContext<'_, '_>,
        out: &mut dyn handlebars::Output,
    ) -> handlebars::HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
        out.write(&text.to_uppercase())?;
        Ok(())
    }

    #[test]
    fn test_injected_helper() {
        let mut engine = TemplateEngine::bare();
        engine.register_helper("shout", Box::new(shout));
        engine.register_template_string("t", "{{shout name}}").unwrap();
        assert_eq!(engine.render("t", &json!({"name": "hi"})).unwrap(), "HI");
    }

    #[test]
    fn test_template_override() {
        let mut engine = TemplateEngine::new();
        engine.register_template_string("o", "Version 1").unwrap();
        engine.register_template_string("o", "Version 2").unwrap();
        assert_eq!(engine.render("o", &json!({})).unwrap(), "Version 2");
    }

    #[test]
    fn test_concurrent_template_usage() {
        // TemplateEngine should be Send + Sync
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine>();
    }
}
