//! Plugin registry keeps track of available language plugins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::{LanguagePlugin, PluginError, PluginResult, PluginSummary};

/// Lookup table from language identifiers and extensions to plugins.
///
/// Populated once at startup and then shared read-only (typically behind an
/// [`Arc`]).
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Arc<dyn LanguagePlugin>>,
    extensions: HashMap<&'static str, &'static str>,
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin keyed by its [`LanguagePlugin::id`].
    pub fn register<P>(&mut self, plugin: P)
    where
        P: LanguagePlugin + 'static,
    {
        self.register_arc(Arc::new(plugin));
    }

    /// Register an already shared plugin. Later registrations win on id or
    /// extension collisions.
    pub fn register_arc(&mut self, plugin: Arc<dyn LanguagePlugin>) {
        let id = plugin.id();
        for extension in plugin.extensions() {
            self.extensions.insert(*extension, id);
        }
        self.plugins.insert(id, plugin);
    }

    /// Retrieve a plugin by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn LanguagePlugin>> {
        self.plugins.get(id).cloned()
    }

    /// Resolve a language identifier, then a file extension (case-sensitive,
    /// leading dot required).
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedLanguage`] when nothing matches.
    pub fn resolve(&self, language_or_extension: &str) -> PluginResult<Arc<dyn LanguagePlugin>> {
        if let Some(plugin) = self.get(language_or_extension) {
            return Ok(plugin);
        }

        if language_or_extension.starts_with('.') {
            if let Some(plugin) = self
                .extensions
                .get(language_or_extension)
                .and_then(|id| self.get(id))
            {
                return Ok(plugin);
            }
        }

        Err(PluginError::unsupported(language_or_extension))
    }

    /// Resolve the plugin for a file path by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedLanguage`] when the path has no
    /// extension or no plugin claims it.
    pub fn resolve_path(&self, path: &Path) -> PluginResult<Arc<dyn LanguagePlugin>> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| PluginError::unsupported(path.display().to_string()))?;
        self.resolve(&format!(".{extension}"))
    }

    /// Whether any plugin claims the path's extension.
    #[must_use]
    pub fn supports_path(&self, path: &Path) -> bool {
        self.resolve_path(path).is_ok()
    }

    /// Returns the list of registered plugin identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }

    /// Summaries for every registered plugin, sorted by id.
    #[must_use]
    pub fn summaries(&self) -> Vec<PluginSummary> {
        let mut summaries: Vec<PluginSummary> = self
            .plugins
            .values()
            .map(|plugin| PluginSummary {
                id: plugin.id().to_owned(),
                label: plugin.label().to_owned(),
                extensions: plugin
                    .extensions()
                    .iter()
                    .map(|ext| (*ext).to_owned())
                    .collect(),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.ids().collect();
        ids.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field("plugins", &ids)
            .finish_non_exhaustive()
    }
}
