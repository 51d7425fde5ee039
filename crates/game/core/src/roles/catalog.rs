use std::collections::BTreeMap;

use super::{Faction, NightCapability, RoleId, RoleSpec};

/// Fixed mapping of role id to [`RoleSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: BTreeMap<RoleId, RoleSpec>,
}

impl RoleCatalog {
    /// Creates a catalog from explicit specs. Later duplicates replace earlier ones.
    pub fn from_specs(specs: impl IntoIterator<Item = RoleSpec>) -> Self {
        Self {
            roles: specs
                .into_iter()
                .map(|spec| (spec.role_id, spec))
                .collect(),
        }
    }

    /// The built-in role set.
    ///
    /// Witch, cupid and mason are listed with no night capability and the
    /// wolf cub votes with the pack; their special rules are not modelled.
    pub fn standard() -> Self {
        use Faction::*;
        use NightCapability as Cap;

        Self::from_specs([
            RoleSpec::new(RoleId::Villager, "Villager", Village, Cap::None),
            RoleSpec::new(RoleId::Werewolf, "Werewolf", Werewolf, Cap::KillVote)
                .without_self_target(),
            RoleSpec::new(RoleId::Seer, "Seer", Village, Cap::Investigate).without_self_target(),
            RoleSpec::new(RoleId::Doctor, "Doctor", Village, Cap::ProtectDoctor),
            RoleSpec::new(RoleId::Guard, "Guard", Village, Cap::ProtectGuard)
                .without_self_target()
                .without_repeat_target(),
            RoleSpec::new(RoleId::Hunter, "Hunter", Village, Cap::DeathShot).without_self_target(),
            RoleSpec::new(RoleId::Witch, "Witch", Village, Cap::None),
            RoleSpec::new(RoleId::Cupid, "Cupid", Village, Cap::None),
            RoleSpec::new(RoleId::Mason, "Mason", Village, Cap::None),
            RoleSpec::new(RoleId::WolfCub, "Wolf Cub", Werewolf, Cap::KillVote)
                .without_self_target(),
        ])
    }

    pub fn get(&self, role_id: RoleId) -> Option<&RoleSpec> {
        self.roles.get(&role_id)
    }

    pub fn contains(&self, role_id: RoleId) -> bool {
        self.roles.contains_key(&role_id)
    }

    /// Iterates roles in role-id order.
    pub fn iter(&self) -> impl Iterator<Item = &RoleSpec> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Faction of a role, defaulting to village for roles the catalog lacks.
    pub fn faction_of(&self, role_id: RoleId) -> Faction {
        self.get(role_id)
            .map(|spec| spec.faction)
            .unwrap_or(Faction::Village)
    }

    pub fn capability_of(&self, role_id: RoleId) -> NightCapability {
        self.get(role_id)
            .map(|spec| spec.night_capability)
            .unwrap_or(NightCapability::None)
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
