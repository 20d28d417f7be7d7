//! Command registry: the static table of command definitions and the
//! handlers bound to them.

use crate::context::InvocationContext;
use crate::error::{CommandError, RegistryError};
use async_trait::async_trait;
use megabot_common::RoleId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Kind of value a command parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    String,
    Integer,
    Boolean,
    Channel,
    User,
    Role,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "text",
            Self::Integer => "number",
            Self::Boolean => "true/false",
            Self::Channel => "channel",
            Self::User => "user",
            Self::Role => "role",
        };
        f.write_str(name)
    }
}

/// One declared parameter of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub required: bool,
    pub description: String,
}

impl ParameterSpec {
    /// A required parameter.
    pub fn required(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: description.to_string(),
        }
    }

    /// An optional parameter.
    pub fn optional(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Immutable description of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub required_role: Option<RoleId>,
    /// Declared in invocation order; message arguments map positionally.
    pub parameters: Vec<ParameterSpec>,
}

impl CommandDefinition {
    /// Creates a definition. The name is normalized to lowercase.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            description: description.to_string(),
            required_role: None,
            parameters: Vec::new(),
        }
    }

    /// Sets the role a member must hold to run the command.
    #[must_use]
    pub fn required_role(mut self, role: Option<RoleId>) -> Self {
        self.required_role = role;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Body of a command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command. Errors are caught and reported by the dispatcher.
    async fn execute(&self, ctx: &mut InvocationContext) -> Result<(), CommandError>;
}

/// A definition together with its handler.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub definition: CommandDefinition,
    pub handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Registry for managing bot commands.
///
/// Built once at startup, then sealed and shared behind an `Arc`; the
/// dispatcher never sees a mutable registry.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
    sealed: bool,
}

impl CommandRegistry {
    /// Create an empty, unsealed registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. A duplicate name keeps the first registration.
    pub fn register<H>(&mut self, definition: CommandDefinition, handler: H) -> Result<(), RegistryError>
    where
        H: CommandHandler + 'static,
    {
        self.register_arc(definition, Arc::new(handler))
    }

    /// Register a command whose handler is already shared.
    pub fn register_arc(
        &mut self,
        definition: CommandDefinition,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        let name = definition.name.clone();
        if self.sealed {
            return Err(RegistryError::Sealed(name));
        }
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name));
        }
        if self.commands.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        debug!("Registered command '{}'", name);
        self.commands.insert(name, RegisteredCommand { definition, handler });
        Ok(())
    }

    /// Freeze the table.
    #[must_use]
    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Whether [`seal`](Self::seal) has been called.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Look up a command by name (case-insensitive).
    pub fn lookup(&self, name: &str) -> Result<&RegisteredCommand, RegistryError> {
        let key = name.to_lowercase();
        self.commands
            .get(&key)
            .ok_or(RegistryError::NotFound(key))
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<&CommandDefinition> {
        let mut definitions: Vec<_> = self.commands.values().map(|c| &c.definition).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn execute(&self, _ctx: &mut InvocationContext) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDefinition::new("ping", "first"), Noop)
            .unwrap();

        let err = registry
            .register(CommandDefinition::new("PING", "second"), Noop)
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateName("ping".to_string()));
        assert_eq!(registry.lookup("ping").unwrap().definition.description, "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sealed_registry_rejects_registration() {
        let mut registry = CommandRegistry::new().seal();
        let err = registry
            .register(CommandDefinition::new("ping", ""), Noop)
            .unwrap_err();
        assert_eq!(err, RegistryError::Sealed("ping".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut registry = CommandRegistry::new();
        assert!(matches!(
            registry.register(CommandDefinition::new("  ", ""), Noop),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(CommandDefinition::new("two words", ""), Noop),
            Err(RegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_reports_missing() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDefinition::new("Lockdown", ""), Noop).unwrap();

        assert!(registry.lookup("LOCKDOWN").is_ok());
        assert_eq!(
            registry.lookup("nuke").unwrap_err(),
            RegistryError::NotFound("nuke".to_string())
        );
    }

    #[test]
    fn test_definitions_are_sorted() {
        let mut registry = CommandRegistry::new();
        for name in ["unlockdown", "ping", "lockdown"] {
            registry.register(CommandDefinition::new(name, ""), Noop).unwrap();
        }
        let names: Vec<_> = registry.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["lockdown", "ping", "unlockdown"]);
    }
}
