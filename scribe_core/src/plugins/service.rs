use std::path::Path;
use std::sync::Arc;

use super::{LanguagePlugin, PluginError, PluginRegistry, PluginSummary, SyntaxTree};
use crate::{Error, Result};

/// High-level façade over the read-only plugin registry.
///
/// Translates plugin failures into crate errors that carry the file being
/// processed.
#[derive(Clone)]
pub struct PluginService {
    registry: Arc<PluginRegistry>,
}

impl PluginService {
    /// Create a plugin service backed by the provided registry.
    #[must_use]
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// List summaries for all registered plugins.
    #[must_use]
    pub fn summaries(&self) -> Vec<PluginSummary> {
        self.registry.summaries()
    }

    /// Resolve a plugin by identifier or dotted extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLanguage`] when nothing matches.
    pub fn resolve(&self, language: &str) -> Result<Arc<dyn LanguagePlugin>> {
        self.registry
            .resolve(language)
            .map_err(|err| Self::translate("registry", language, err))
    }

    /// Resolve a plugin from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLanguage`] naming the path.
    pub fn resolve_path(&self, path: &Path) -> Result<Arc<dyn LanguagePlugin>> {
        self.registry
            .resolve_path(path)
            .map_err(|_| Error::UnsupportedLanguage {
                language: path.display().to_string(),
            })
    }

    /// Whether some plugin handles `path`.
    #[must_use]
    pub fn supports_path(&self, path: &Path) -> bool {
        self.registry.supports_path(path)
    }

    /// Parse `source` with `plugin`, attributing failures to `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the first error location, or
    /// [`Error::Plugin`] when the grammar cannot be loaded.
    pub fn parse(
        plugin: &dyn LanguagePlugin,
        origin: &str,
        source: &str,
    ) -> Result<SyntaxTree> {
        plugin
            .parse(source)
            .map_err(|err| Self::translate(plugin.id(), origin, err))
    }

    fn translate(plugin_id: &str, origin: &str, err: PluginError) -> Error {
        match err {
            PluginError::UnsupportedLanguage { language } => {
                Error::UnsupportedLanguage { language }
            }
            PluginError::Parse(source) => Error::Parse {
                path: origin.to_owned(),
                source,
            },
            other => Error::Plugin {
                plugin: plugin_id.to_owned(),
                source: other,
            },
        }
    }
}

impl std::fmt::Debug for PluginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut plugin_ids: Vec<&str> = self.registry.ids().collect();
        plugin_ids.sort_unstable();
        f.debug_struct("PluginService")
            .field("plugins", &plugin_ids)
            .finish()
    }
}
