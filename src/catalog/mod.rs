//! Option catalogs
//!
//! Named, ordered choice lists for enumerated wizard steps. Catalogs come
//! from built-in defaults merged with the `[catalogs]` table of the settings
//! file; project-derived lists are layered on top per command.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::Settings;
use crate::wizard::{OptionProvider, WizardError};

pub const NONE_OPTION: &str = "None";
pub const BOOLEAN: &str = "boolean";
pub const REVERSE_BOOLEAN: &str = "reverseBoolean";

/// Catalog-backed option provider
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    catalogs: BTreeMap<String, Vec<String>>,
}

impl CatalogProvider {
    /// Provider with no catalogs apart from the boolean ones.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in catalogs overridden by the ones in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut catalogs = default_catalogs();
        for (key, items) in &settings.catalogs {
            catalogs.insert(key.clone(), items.clone());
        }
        Self { catalogs }
    }

    pub fn with(mut self, key: &str, items: &[&str]) -> Self {
        self.catalogs
            .insert(key.to_string(), items.iter().map(|s| s.to_string()).collect());
        self
    }

    fn lookup(&self, key: &str) -> Option<Vec<String>> {
        match key {
            BOOLEAN => Some(vec!["true".to_string(), "false".to_string()]),
            REVERSE_BOOLEAN => Some(vec!["false".to_string(), "true".to_string()]),
            _ => self.catalogs.get(key).cloned(),
        }
    }
}

#[async_trait]
impl OptionProvider for CatalogProvider {
    async fn options(
        &self,
        catalog_key: &str,
        include_none: bool,
    ) -> Result<Vec<String>, WizardError> {
        let items = self
            .lookup(catalog_key)
            .ok_or_else(|| WizardError::CatalogUnavailable(catalog_key.to_string()))?;
        debug!("Catalog {} resolved to {} options", catalog_key, items.len());
        Ok(with_none(items, include_none))
    }
}

/// Command-local catalogs consulted before an inner provider.
///
/// Used for lists that only exist in the loaded project configuration, such
/// as the configured build configurations or the platforms still available.
pub struct LayeredOptions<'a> {
    local: BTreeMap<String, Vec<String>>,
    inner: &'a dyn OptionProvider,
}

impl<'a> LayeredOptions<'a> {
    pub fn new(inner: &'a dyn OptionProvider) -> Self {
        Self {
            local: BTreeMap::new(),
            inner,
        }
    }

    pub fn with(mut self, key: impl Into<String>, items: Vec<String>) -> Self {
        self.local.insert(key.into(), items);
        self
    }
}

#[async_trait]
impl OptionProvider for LayeredOptions<'_> {
    async fn options(
        &self,
        catalog_key: &str,
        include_none: bool,
    ) -> Result<Vec<String>, WizardError> {
        match self.local.get(catalog_key) {
            Some(items) => Ok(with_none(items.clone(), include_none)),
            None => self.inner.options(catalog_key, include_none).await,
        }
    }
}

fn with_none(items: Vec<String>, include_none: bool) -> Vec<String> {
    if include_none {
        std::iter::once(NONE_OPTION.to_string())
            .chain(items)
            .collect()
    } else {
        items
    }
}

/// Catalog entries shipped with the tool.
pub fn default_catalogs() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        (
            "applicationFramework",
            &["Angular", "Aurelia", "PlainApp", "Polymer", "Preact", "React", "Vue"],
        ),
        ("language", &["JavaScript", "TypeScript"]),
        ("linter", &["ESLint", "TSLint"]),
        ("moduleType", &["AMD", "CommonJS", "SystemJS"]),
        ("bundler", &["Browserify", "RequireJS", "SystemJSBuilder", "Webpack"]),
        ("unitTestRunner", &["Jest", "Karma"]),
        ("testFramework", &["Jasmine", "MochaChai"]),
        ("unitTestEngine", &["ChromeHeadless", "JSDom", "PhantomJS"]),
        ("e2eTestRunner", &["Protractor", "WebdriverIO"]),
        ("cssPre", &["Css", "Less", "PostCss", "Sass", "Stylus"]),
        ("cssPost", &["None", "PostCss"]),
        ("cssLinter", &["None", "Stylelint"]),
        ("packageManager", &["Npm", "Yarn"]),
        ("platform", &["Cordova", "Docker", "Electron", "Web"]),
        (
            "license",
            &["None", "Apache-2.0", "BSD-3-Clause", "GPL-3.0", "ISC", "MIT", "MPL-2.0"],
        ),
        (
            "profile.configure",
            &[
                "AngularJavaScript",
                "AngularTypeScript",
                "AureliaJavaScript",
                "AureliaTypeScript",
                "ReactJavaScript",
                "ReactTypeScript",
                "VueJavaScript",
                "VueTypeScript",
            ],
        ),
        (
            "profile.clientPackage",
            &["bluebird", "font-awesome", "jquery", "moment", "rxjs", "whatwg-fetch"],
        ),
        (
            "unitBrowser",
            &["chrome", "chromeheadless", "edge", "firefox", "ie", "phantomjs", "safari"],
        ),
        ("e2eBrowser", &["chrome", "edge", "firefox", "ie"]),
        ("generate.angular", &["class", "component", "directive", "pipe", "service"]),
        ("generate.aurelia", &["attribute", "binding-behavior", "class", "element", "page"]),
        ("generate.plainapp", &["class"]),
        ("generate.polymer", &["class", "element"]),
        ("generate.preact", &["class", "component"]),
        ("generate.react", &["class", "component"]),
        ("generate.vue", &["class", "component"]),
    ];

    entries
        .iter()
        .map(|(key, items)| {
            (
                key.to_string(),
                items.iter().map(|item| item.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_none_option_is_prepended() {
        let provider = CatalogProvider::empty().with("linter", &["ESLint", "TSLint"]);
        let options = provider.options("linter", true).await.unwrap();
        assert_eq!(options, vec!["None", "ESLint", "TSLint"]);

        let options = provider.options("linter", false).await.unwrap();
        assert_eq!(options, vec!["ESLint", "TSLint"]);
    }

    #[tokio::test]
    async fn test_boolean_catalogs() {
        let provider = CatalogProvider::empty();
        assert_eq!(provider.options(BOOLEAN, false).await.unwrap(), vec!["true", "false"]);
        assert_eq!(
            provider.options(REVERSE_BOOLEAN, false).await.unwrap(),
            vec!["false", "true"]
        );
    }

    #[tokio::test]
    async fn test_missing_catalog_is_unavailable() {
        let provider = CatalogProvider::empty();
        let err = provider.options("bundler", false).await.unwrap_err();
        assert!(matches!(err, WizardError::CatalogUnavailable(key) if key == "bundler"));
    }

    #[tokio::test]
    async fn test_settings_override_defaults() {
        let mut settings = Settings::default();
        settings
            .catalogs
            .insert("bundler".to_string(), vec!["Webpack".to_string()]);

        let provider = CatalogProvider::from_settings(&settings);
        assert_eq!(provider.options("bundler", false).await.unwrap(), vec!["Webpack"]);
        assert!(provider.options("language", false).await.is_ok());
    }

    #[tokio::test]
    async fn test_layered_options_prefer_local() {
        let base = CatalogProvider::empty().with("platform", &["Cordova", "Web"]);
        let layered = LayeredOptions::new(&base).with("platform", vec!["Web".to_string()]);

        assert_eq!(layered.options("platform", false).await.unwrap(), vec!["Web"]);
        assert_eq!(layered.options(BOOLEAN, false).await.unwrap(), vec!["true", "false"]);
    }
}
