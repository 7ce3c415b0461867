//! Platform permission flags.
//!
//! The platform delivers effective permissions as a decimal bit string. A
//! [`Permissions`] value is a set of [`Permission`] flags; the Gate compares a
//! required set against the effective set with [`Permissions::missing`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! permissions {
    ($($name:ident = $bit:expr),* $(,)?) => {
        /// A single platform permission flag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Permission {
            $(
                #[allow(missing_docs)]
                $name,
            )*
        }

        impl Permission {
            /// Every known permission, in bit order.
            pub const ALL: &'static [Permission] = &[$(Permission::$name),*];

            /// Returns the bit mask of this flag.
            pub const fn bits(self) -> u64 {
                match self {
                    $(Permission::$name => 1 << $bit,)*
                }
            }

            /// Returns the PascalCase platform name (e.g. `SendMessages`).
            pub const fn name(self) -> &'static str {
                match self {
                    $(Permission::$name => stringify!($name),)*
                }
            }
        }

        impl FromStr for Permission {
            type Err = UnknownPermission;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($name) => Ok(Permission::$name),)*
                    other => Err(UnknownPermission(other.to_string())),
                }
            }
        }
    };
}

permissions! {
    CreateInstantInvite = 0,
    KickMembers = 1,
    BanMembers = 2,
    Administrator = 3,
    ManageChannels = 4,
    ManageGuild = 5,
    AddReactions = 6,
    ViewAuditLog = 7,
    PrioritySpeaker = 8,
    Stream = 9,
    ViewChannel = 10,
    SendMessages = 11,
    SendTTSMessages = 12,
    ManageMessages = 13,
    EmbedLinks = 14,
    AttachFiles = 15,
    ReadMessageHistory = 16,
    MentionEveryone = 17,
    UseExternalEmojis = 18,
    ViewGuildInsights = 19,
    Connect = 20,
    Speak = 21,
    MuteMembers = 22,
    DeafenMembers = 23,
    MoveMembers = 24,
    UseVAD = 25,
    ChangeNickname = 26,
    ManageNicknames = 27,
    ManageRoles = 28,
    ManageWebhooks = 29,
    ManageGuildExpressions = 30,
    UseApplicationCommands = 31,
    RequestToSpeak = 32,
    ManageEvents = 33,
    ManageThreads = 34,
    CreatePublicThreads = 35,
    CreatePrivateThreads = 36,
    UseExternalStickers = 37,
    SendMessagesInThreads = 38,
    UseEmbeddedActivities = 39,
    ModerateMembers = 40,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unrecognised permission name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

/// A set of permission flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Permissions(u64);

impl Permissions {
    /// The empty set.
    pub const NONE: Self = Self(0);

    /// Builds a set from raw bits. Unknown bits are kept as-is.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if the set holds no flags.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `permission` is in the set.
    pub const fn contains(self, permission: Permission) -> bool {
        self.0 & permission.bits() != 0
    }

    /// Returns a copy of the set with `permission` added.
    pub const fn with(self, permission: Permission) -> Self {
        Self(self.0 | permission.bits())
    }

    /// Iterates the known flags held by this set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL
            .iter()
            .copied()
            .filter(move |p| self.contains(*p))
    }

    /// Computes `required \ self`: the flags of `required` this set lacks.
    ///
    /// `Administrator` grants everything, so an administrator set never
    /// misses anything.
    pub fn missing(self, required: Permissions) -> Vec<Permission> {
        if self.contains(Permission::Administrator) {
            return Vec::new();
        }
        Permissions(required.0 & !self.0).iter().collect()
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl<const N: usize> From<[Permission; N]> for Permissions {
    fn from(flags: [Permission; N]) -> Self {
        flags.into_iter().collect()
    }
}

impl FromStr for Permissions {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Formats a list of permissions as `` `A`, `B` `` for user-facing replies.
pub fn format_permission_list(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| format!("`{p}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_set_difference() {
        let effective = Permissions::from([Permission::SendMessages, Permission::ViewChannel]);
        let required = Permissions::from([Permission::SendMessages, Permission::EmbedLinks]);
        assert_eq!(effective.missing(required), vec![Permission::EmbedLinks]);
    }

    #[test]
    fn test_administrator_misses_nothing() {
        let effective = Permissions::from([Permission::Administrator]);
        let required = Permissions::from([Permission::ManageMessages, Permission::EmbedLinks]);
        assert!(effective.missing(required).is_empty());
    }

    #[test]
    fn test_parse_bit_string() {
        // SendMessages (1 << 11) | EmbedLinks (1 << 14)
        let parsed: Permissions = "18432".parse().unwrap();
        assert!(parsed.contains(Permission::SendMessages));
        assert!(parsed.contains(Permission::EmbedLinks));
        assert!(!parsed.contains(Permission::AttachFiles));
    }

    #[test]
    fn test_format_permission_list() {
        let text = format_permission_list(&[Permission::SendMessages, Permission::EmbedLinks]);
        assert_eq!(text, "`SendMessages`, `EmbedLinks`");
    }

    #[test]
    fn test_permission_name_round_trip() {
        assert_eq!("UseVAD".parse::<Permission>().unwrap(), Permission::UseVAD);
        assert!("Flying".parse::<Permission>().is_err());
    }
}
