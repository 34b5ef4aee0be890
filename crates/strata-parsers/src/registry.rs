//! Registry of format plugins
//!
//! The set of plugins is an explicit list built at startup; nothing is
//! discovered at runtime. Once built the registry is read-only and shared
//! between concurrent scans.

use thiserror::Error;

use crate::error::ParseError;
use crate::plugins::{
    BashHistoryPlugin, FirefoxDownloadsPlugin, FirefoxHistoryPlugin, ZshHistoryPlugin,
};
use crate::sqlite::SqlitePlugin;
use crate::text::TextPlugin;

/// Registry error
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A plugin with this name is already registered
    #[error("Plugin already registered: {0}")]
    Duplicate(String),

    /// No plugin with this name exists
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),
}

/// Family of sources a plugin reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Line-oriented text
    Text,
    /// SQLite database
    Sqlite,
}

impl PluginKind {
    /// Prefix used in parser chains
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Text => "text",
            PluginKind::Sqlite => "sqlite",
        }
    }
}

/// What a plugin needs before it accepts a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Accepts text sources that pass its verification probe
    Verify,
    /// Accepts relational sources containing all of these tables
    RequiredTables(Vec<&'static str>),
}

/// Static description of a registered plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    /// Unique plugin name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Source family
    pub kind: PluginKind,
    /// Acceptance requirement
    pub capability: Capability,
}

/// A registered plugin
pub enum Plugin {
    /// Text-format plugin
    Text(Box<dyn TextPlugin>),
    /// Relational-format plugin
    Sqlite(Box<dyn SqlitePlugin>),
}

impl Plugin {
    /// Unique plugin name
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::Text(plugin) => plugin.name(),
            Plugin::Sqlite(plugin) => plugin.name(),
        }
    }

    /// Source family
    pub fn kind(&self) -> PluginKind {
        match self {
            Plugin::Text(_) => PluginKind::Text,
            Plugin::Sqlite(_) => PluginKind::Sqlite,
        }
    }

    /// Static description
    pub fn descriptor(&self) -> CapabilityDescriptor {
        match self {
            Plugin::Text(plugin) => CapabilityDescriptor {
                name: plugin.name(),
                description: plugin.description(),
                kind: PluginKind::Text,
                capability: Capability::Verify,
            },
            Plugin::Sqlite(plugin) => CapabilityDescriptor {
                name: plugin.name(),
                description: plugin.description(),
                kind: PluginKind::Sqlite,
                capability: Capability::RequiredTables(plugin.required_tables().to_vec()),
            },
        }
    }
}

/// Registry of available plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in plugin
    pub fn with_default_plugins() -> Result<Self, ParseError> {
        let mut registry = Self::new();
        registry.register(Plugin::Text(Box::new(BashHistoryPlugin::new()?)))?;
        registry.register(Plugin::Text(Box::new(ZshHistoryPlugin::new()?)))?;
        registry.register(Plugin::Sqlite(Box::new(FirefoxHistoryPlugin::new())))?;
        registry.register(Plugin::Sqlite(Box::new(FirefoxDownloadsPlugin::new())))?;
        Ok(registry)
    }

    /// Add a plugin; names must be unique
    pub fn register(&mut self, plugin: Plugin) -> Result<(), RegistryError> {
        if self.get(plugin.name()).is_some() {
            return Err(RegistryError::Duplicate(plugin.name().to_string()));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Look up a plugin by name
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.name() == name)
    }

    /// All plugins in registration order
    pub fn plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Descriptors of all plugins in registration order
    pub fn descriptors(&self) -> Vec<CapabilityDescriptor> {
        self.plugins.iter().map(Plugin::descriptor).collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plugins() {
        let registry = PluginRegistry::with_default_plugins().unwrap();

        let names: Vec<_> = registry.plugins().map(Plugin::name).collect();
        assert_eq!(
            names,
            vec!["bash", "zsh_extended_history", "firefox_history", "firefox_downloads"]
        );
    }

    #[test]
    fn test_descriptors() {
        let registry = PluginRegistry::with_default_plugins().unwrap();
        let descriptors = registry.descriptors();

        assert_eq!(descriptors[0].capability, Capability::Verify);
        assert_eq!(
            descriptors[3].capability,
            Capability::RequiredTables(vec!["moz_downloads"])
        );
        assert_eq!(
            registry.get("firefox_history").unwrap().kind(),
            PluginKind::Sqlite
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin::Sqlite(Box::new(FirefoxDownloadsPlugin::new())))
            .unwrap();
        let result = registry.register(Plugin::Sqlite(Box::new(FirefoxDownloadsPlugin::new())));

        assert!(matches!(result, Err(RegistryError::Duplicate(_))));
        assert_eq!(registry.len(), 1);
    }
}
