//! Official scribe language plugins.

mod ast;
mod c;
mod c_family;
mod cpp;
mod java;
mod javascript;
mod python;

pub use c::CPlugin;
pub use cpp::CppPlugin;
pub use java::JavaPlugin;
pub use javascript::JavaScriptPlugin;
pub use python::PythonPlugin;

use scribe_plugin_api::PluginRegistry;

/// Build a plugin registry populated with every bundled language.
#[must_use]
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(PythonPlugin);
    registry.register(JavaScriptPlugin);
    registry.register(JavaPlugin);
    registry.register(CPlugin);
    registry.register(CppPlugin);
    registry
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use scribe_api::CommentStyle;
    use scribe_plugin_api::PluginError;

    use super::*;

    #[test]
    fn default_registry_covers_bundled_languages() {
        let registry = default_registry();
        let ids: Vec<String> = registry.summaries().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "cpp", "java", "javascript", "python"]);

        assert_eq!(registry.resolve(".h").expect("header").id(), "cpp");
        assert_eq!(registry.resolve(".c").expect("c").id(), "c");
        assert_eq!(
            registry
                .resolve_path(Path::new("web/app.mjs"))
                .expect("module")
                .id(),
            "javascript"
        );
    }

    #[test]
    fn ruby_is_unsupported() {
        let err = default_registry().resolve(".rb").err().expect("no ruby plugin");
        assert!(matches!(err, PluginError::UnsupportedLanguage { language } if language == ".rb"));
    }

    #[test]
    fn every_style_round_trips_through_extraction() {
        let registry = default_registry();
        let text = "Loads the configuration.\n\nFails when the file is missing.";
        let expected: Vec<&str> = text.lines().collect();
        let styles = [
            CommentStyle::Google,
            CommentStyle::Numpy,
            CommentStyle::Doxygen,
            CommentStyle::Javadoc,
            CommentStyle::Jsdoc,
            CommentStyle::Line,
        ];

        for summary in registry.summaries() {
            let plugin = registry.get(&summary.id).expect("registered");
            for style in styles {
                for indent in [0, 4] {
                    let rendered = plugin.format_comment(text, indent, style).join("\n");
                    assert_eq!(
                        plugin.extract_comments(&rendered),
                        expected,
                        "{} / {style} / indent {indent}",
                        summary.id
                    );
                }
            }
        }
    }
}
