//! Built-in command table and dispatcher wiring.

use crate::cooldown::CooldownGate;
use crate::dispatcher::CommandDispatcher;
use crate::error::RegistryError;
use crate::guild::GuildActions;
use crate::lockdown::Lockdown;
use crate::ping::Ping;
use crate::registry::CommandRegistry;
use crate::verification::VerificationSetup;
use megabot_common::{RoleId, UserId};
use std::sync::Arc;
use std::time::Duration;

/// Roles gating each command group. `None` leaves a group open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandRoles {
    pub general: Option<RoleId>,
    pub moderation: Option<RoleId>,
    pub music: Option<RoleId>,
}

/// Registry with `ping`, `verification-setup`, `lockdown` and `unlockdown`.
///
/// Returned unsealed so callers can add more commands (music) first.
pub fn builtin_registry(
    roles: &CommandRoles,
    guild: &Arc<dyn GuildActions>,
) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(Ping::definition(roles.general), Ping)?;
    registry.register(
        VerificationSetup::definition(roles.general),
        VerificationSetup::new(guild.clone()),
    )?;

    for lockdown in [Lockdown::engage(guild.clone()), Lockdown::lift(guild.clone())] {
        registry.register(lockdown.definition(roles.moderation), lockdown)?;
    }
    Ok(registry)
}

/// Seal `registry` and build a dispatcher with a fresh cooldown gate.
pub fn create_dispatcher(
    registry: CommandRegistry,
    owner: Option<UserId>,
    window: Duration,
) -> CommandDispatcher {
    CommandDispatcher::new(
        Arc::new(registry.seal()),
        Arc::new(CooldownGate::new()),
        owner,
        window,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guild::MockGuildActions;

    #[test]
    fn test_builtin_roles() {
        let roles = CommandRoles {
            general: Some(RoleId(1)),
            moderation: Some(RoleId(2)),
            music: Some(RoleId(3)),
        };
        let guild: Arc<dyn GuildActions> = Arc::new(MockGuildActions::new());
        let registry = builtin_registry(&roles, &guild).unwrap();

        let table: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| (d.name.as_str(), d.required_role))
            .collect();
        assert_eq!(
            table,
            [
                ("lockdown", Some(RoleId(2))),
                ("ping", Some(RoleId(1))),
                ("unlockdown", Some(RoleId(2))),
                ("verification-setup", Some(RoleId(1))),
            ]
        );
    }

    #[test]
    fn test_dispatcher_registry_is_sealed() {
        let guild: Arc<dyn GuildActions> = Arc::new(MockGuildActions::new());
        let registry = builtin_registry(&CommandRoles::default(), &guild).unwrap();
        let dispatcher = create_dispatcher(registry, None, Duration::from_secs(5));
        assert!(dispatcher.registry().is_sealed());
        assert_eq!(dispatcher.registry().len(), 4);
    }
}
