//! Role definitions and the catalog that maps role ids to their rules.
//!
//! The engine never branches on a role's name. Everything it needs to know
//! about a role (faction, what the role does at night, targeting limits) is
//! carried by [`RoleSpec`], so new roles only need a catalog entry.

mod catalog;

pub use catalog::RoleCatalog;

/// Identifier of a catalogued role.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum RoleId {
    Villager,
    Werewolf,
    Seer,
    Doctor,
    Guard,
    Hunter,
    Witch,
    Cupid,
    Mason,
    WolfCub,
}

impl RoleId {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Side a role wins with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Faction {
    Village,
    Werewolf,
}

impl Faction {
    pub fn is_werewolf(self) -> bool {
        matches!(self, Faction::Werewolf)
    }
}

/// What a role contributes to the night (or, for the hunter, to its own death).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum NightCapability {
    None,
    KillVote,
    Investigate,
    ProtectDoctor,
    ProtectGuard,
    DeathShot,
}

impl NightCapability {
    /// Returns true when the role submits an action during the night.
    ///
    /// `DeathShot` is excluded: the hunter acts only in its revenge interrupt.
    pub fn acts_at_night(self) -> bool {
        matches!(
            self,
            NightCapability::KillVote
                | NightCapability::Investigate
                | NightCapability::ProtectDoctor
                | NightCapability::ProtectGuard
        )
    }
}

/// Catalog entry for one role.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleSpec {
    pub role_id: RoleId,
    pub name: String,
    pub faction: Faction,
    pub night_capability: NightCapability,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub target_self_allowed: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub target_repeat_allowed: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl RoleSpec {
    pub fn new(
        role_id: RoleId,
        name: impl Into<String>,
        faction: Faction,
        night_capability: NightCapability,
    ) -> Self {
        Self {
            role_id,
            name: name.into(),
            faction,
            night_capability,
            target_self_allowed: true,
            target_repeat_allowed: true,
        }
    }

    #[must_use]
    pub fn without_self_target(mut self) -> Self {
        self.target_self_allowed = false;
        self
    }

    #[must_use]
    pub fn without_repeat_target(mut self) -> Self {
        self.target_repeat_allowed = false;
        self
    }

    pub fn is_werewolf(&self) -> bool {
        self.faction.is_werewolf()
    }
}
