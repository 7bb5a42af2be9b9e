//! Roles and their display titles.

use serde::{Deserialize, Serialize};

/// Closed set of roles a player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary town member.
    #[serde(alias = "peace", alias = "citizen")]
    Civilian,
    /// Member of the mafia team.
    Mafia,
    /// Head of the mafia team; sets the shooting order and checks for the sheriff.
    Don,
    /// Town investigator; checks players for mafia membership.
    Sheriff,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 4] = [Self::Civilian, Self::Mafia, Self::Don, Self::Sheriff];

    /// Whether this role takes part in the night shooting.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Mafia | Self::Don)
    }

    /// Stable identifier used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Civilian => "civilian",
            Self::Mafia => "mafia",
            Self::Don => "don",
            Self::Sheriff => "sheriff",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display titles for each role.
///
/// Loaded from the `lang.roles` section of the configuration; any title
/// left out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTitles {
    /// Title of [`Role::Civilian`]
    pub civilian: String,
    /// Title of [`Role::Mafia`]
    pub mafia: String,
    /// Title of [`Role::Don`]
    pub don: String,
    /// Title of [`Role::Sheriff`]
    pub sheriff: String,
}

impl Default for RoleTitles {
    fn default() -> Self {
        Self {
            civilian: "civilian".to_string(),
            mafia: "mafia".to_string(),
            don: "don".to_string(),
            sheriff: "sheriff".to_string(),
        }
    }
}

impl RoleTitles {
    /// Returns the display title for `role`.
    #[must_use]
    pub fn title(&self, role: Role) -> &str {
        match role {
            Role::Civilian => &self.civilian,
            Role::Mafia => &self.mafia,
            Role::Don => &self.don,
            Role::Sheriff => &self.sheriff,
        }
    }

    /// Returns the title with its first letter upper-cased, for sentence starts.
    #[must_use]
    pub fn capitalized(&self, role: Role) -> String {
        let title = self.title(role);
        let mut chars = title.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}
