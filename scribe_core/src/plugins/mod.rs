//! Language plugin system entry points.

mod service;

pub use scribe_plugin_api::{
    CommentSyntax, LanguagePlugin, ParseError, PluginError, PluginRegistry, PluginResult,
    PluginSummary, SyntaxTree,
};
pub use scribe_plugins::default_registry;

pub use service::PluginService;
