//! Strongly typed platform identifiers.
//!
//! The platform encodes every identifier as a decimal "snowflake" string.
//! Each id kind gets its own newtype so a channel id can never be passed where
//! a message id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Text(String),
                    Number(u64),
                }

                match Raw::deserialize(deserializer)? {
                    Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
                    Raw::Number(n) => Ok(Self(n)),
                }
            }
        }
    };
}

snowflake!(
    /// Identifies a platform user.
    UserId
);
snowflake!(
    /// Identifies a text channel (guild channel or direct message).
    ChannelId
);
snowflake!(
    /// Identifies a guild (server).
    GuildId
);
snowflake!(
    /// Identifies a message within a channel.
    MessageId
);
snowflake!(
    /// Identifies a single interaction delivery.
    InteractionId
);

impl UserId {
    /// Renders the id as a platform mention (`<@id>`).
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}
