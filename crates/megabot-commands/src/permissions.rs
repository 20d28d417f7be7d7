//! Role-based permission gate for commands.

use megabot_common::RoleId;
use tracing::debug;

/// Anything that can answer "does this member hold role X".
pub trait RoleMembership {
    /// Exact membership test; no hierarchy is evaluated.
    fn has_role(&self, role: RoleId) -> bool;
}

/// Resolves whether an invoking member may run a command.
///
/// Owners get no special treatment here: the owner bypass only applies to
/// cooldowns.
pub struct PermissionGate;

impl PermissionGate {
    /// `true` when no role is required, otherwise `true` iff a member is
    /// present and holds `required` exactly.
    pub fn check<M>(member: Option<&M>, required: Option<RoleId>) -> bool
    where
        M: RoleMembership + ?Sized,
    {
        let Some(role) = required else {
            return true;
        };

        match member {
            Some(member) => member.has_role(role),
            None => {
                debug!("No member data for role-gated command, denying");
                false
            }
        }
    }
}
