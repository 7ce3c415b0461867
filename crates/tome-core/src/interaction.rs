//! Inbound interactions.
//!
//! The platform adapter hands over each interaction as raw JSON.
//! [`Interaction::from_value`] classifies it by shape into exactly one of the
//! four handled kinds and extracts the pieces the dispatcher needs:
//!
//! ```text
//! type 2                       → Command       (name, options)
//! type 3, component_type 2     → Button        (custom_id)
//! type 3, component_type 3     → SelectMenu    (custom_id, values)
//! type 4                       → Autocomplete  (name, focused option)
//! ```
//!
//! Guild context is attached only when the payload carries both a guild id
//! and a channel id; the effective permissions come from `app_permissions`
//! (bot) and `member.permissions` (author).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ParseError, ParseResult};
use crate::ids::{ChannelId, GuildId, InteractionId, MessageId, UserId};
use crate::permission::Permissions;

// =============================================================================
// Kinds
// =============================================================================

/// The four interaction kinds that have handler namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Slash command invocation.
    Command,
    /// Button activation.
    Button,
    /// String select menu activation.
    SelectMenu,
    /// Autocomplete request for a command option.
    Autocomplete,
}

impl InteractionKind {
    /// All kinds, in a stable order.
    pub const ALL: [InteractionKind; 4] = [
        InteractionKind::Command,
        InteractionKind::Button,
        InteractionKind::SelectMenu,
        InteractionKind::Autocomplete,
    ];

    /// Lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Command => "command",
            InteractionKind::Button => "button",
            InteractionKind::SelectMenu => "select_menu",
            InteractionKind::Autocomplete => "autocomplete",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Model
// =============================================================================

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Account name.
    #[serde(default)]
    pub username: String,
    /// Whether the account is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Creates a user with only an id and name.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            bot: false,
        }
    }
}

/// Guild context of an interaction raised in a guild channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildScope {
    /// Guild the channel belongs to.
    pub guild_id: GuildId,
    /// Effective permissions of the bot in the channel.
    pub bot_permissions: Permissions,
    /// Effective permissions of the invoking member in the channel.
    pub author_permissions: Permissions,
}

/// Value of a command option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// String option (also used for partial autocomplete input).
    String(String),
    /// Integer option.
    Integer(i64),
    /// Boolean option.
    Boolean(bool),
    /// User option.
    User(UserId),
    /// Floating point option.
    Number(f64),
}

/// A named command option.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Option value.
    pub value: OptionValue,
}

impl CommandOption {
    /// Creates a string option.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::String(value.into()),
        }
    }

    /// Creates a user option.
    pub fn user(name: impl Into<String>, value: impl Into<UserId>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::User(value.into()),
        }
    }

    /// Creates a boolean option.
    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::Boolean(value),
        }
    }
}

/// Slash command payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandData {
    /// Command name.
    pub name: String,
    /// Supplied options.
    pub options: Vec<CommandOption>,
}

impl CommandData {
    fn find(&self, name: &str) -> Option<&OptionValue> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    /// Returns a string option by name.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.find(name)? {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a user option by name.
    pub fn user(&self, name: &str) -> Option<UserId> {
        match self.find(name)? {
            OptionValue::User(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns a boolean option by name.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.find(name)? {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns an integer option by name.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.find(name)? {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// Button or select menu payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentData {
    /// Correlation string attached to the component.
    pub custom_id: String,
    /// Chosen values (select menus only).
    pub values: Vec<String>,
    /// Message the component is attached to.
    pub message_id: Option<MessageId>,
}

/// The option currently being typed in an autocomplete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedOption {
    /// Option name.
    pub name: String,
    /// Partial value typed so far.
    pub value: String,
}

/// Autocomplete payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteData {
    /// Command the option belongs to.
    pub command_name: String,
    /// The option being completed.
    pub focused: FocusedOption,
    /// The other, already supplied options.
    pub options: Vec<CommandOption>,
}

/// Kind-specific payload of an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    /// Slash command.
    Command(CommandData),
    /// Button.
    Button(ComponentData),
    /// String select menu.
    SelectMenu(ComponentData),
    /// Autocomplete request.
    Autocomplete(AutocompleteData),
}

impl InteractionData {
    /// Returns the kind of this payload.
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionData::Command(_) => InteractionKind::Command,
            InteractionData::Button(_) => InteractionKind::Button,
            InteractionData::SelectMenu(_) => InteractionKind::SelectMenu,
            InteractionData::Autocomplete(_) => InteractionKind::Autocomplete,
        }
    }
}

/// A classified inbound interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Interaction id.
    pub id: InteractionId,
    /// Continuation token used by the responder.
    pub token: String,
    /// The invoking user.
    pub user: User,
    /// Channel the interaction was raised in.
    pub channel_id: Option<ChannelId>,
    /// Guild context, when raised in a guild channel.
    pub guild: Option<GuildScope>,
    /// Kind-specific payload.
    pub data: InteractionData,
}

impl Interaction {
    /// Returns the kind of this interaction.
    pub fn kind(&self) -> InteractionKind {
        self.data.kind()
    }

    /// Returns `true` if raised in a guild channel.
    pub fn in_guild(&self) -> bool {
        self.guild.is_some()
    }

    /// Returns the command payload, if this is a command.
    pub fn command(&self) -> Option<&CommandData> {
        match &self.data {
            InteractionData::Command(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the component payload, if this is a button or select menu.
    pub fn component(&self) -> Option<&ComponentData> {
        match &self.data {
            InteractionData::Button(c) | InteractionData::SelectMenu(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the autocomplete payload, if this is an autocomplete request.
    pub fn autocomplete(&self) -> Option<&AutocompleteData> {
        match &self.data {
            InteractionData::Autocomplete(a) => Some(a),
            _ => None,
        }
    }

    /// Classifies a raw platform payload.
    pub fn from_value(value: Value) -> ParseResult<Self> {
        let raw: RawInteraction = serde_json::from_value(value)
            .map_err(|e| ParseError::invalid("interaction", e.to_string()))?;
        raw.into_interaction()
    }

    /// Parses and classifies a raw JSON string.
    pub fn from_json(json: &str) -> ParseResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ParseError::invalid("interaction", e.to_string()))?;
        Self::from_value(value)
    }
}

// =============================================================================
// Raw payload
// =============================================================================

const TYPE_COMMAND: u64 = 2;
const TYPE_COMPONENT: u64 = 3;
const TYPE_AUTOCOMPLETE: u64 = 4;

const COMPONENT_BUTTON: u64 = 2;
const COMPONENT_STRING_SELECT: u64 = 3;

const OPTION_STRING: u64 = 3;
const OPTION_INTEGER: u64 = 4;
const OPTION_BOOLEAN: u64 = 5;
const OPTION_USER: u64 = 6;
const OPTION_NUMBER: u64 = 10;

#[derive(Deserialize)]
struct RawInteraction {
    id: InteractionId,
    #[serde(rename = "type")]
    kind: u64,
    #[serde(default)]
    token: String,
    guild_id: Option<GuildId>,
    channel_id: Option<ChannelId>,
    app_permissions: Option<Permissions>,
    member: Option<RawMember>,
    user: Option<User>,
    data: Option<Value>,
    message: Option<RawMessageRef>,
}

#[derive(Deserialize)]
struct RawMember {
    user: User,
    permissions: Option<Permissions>,
}

#[derive(Deserialize)]
struct RawMessageRef {
    id: MessageId,
}

#[derive(Deserialize)]
struct RawCommandData {
    name: String,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Deserialize)]
struct RawOption {
    name: String,
    #[serde(rename = "type")]
    kind: u64,
    value: Option<Value>,
    #[serde(default)]
    focused: bool,
}

#[derive(Deserialize)]
struct RawComponentData {
    custom_id: String,
    component_type: u64,
    #[serde(default)]
    values: Vec<String>,
}

impl RawInteraction {
    fn into_interaction(self) -> ParseResult<Interaction> {
        let (user, author_permissions) = match (self.member, self.user) {
            (Some(member), _) => (member.user, member.permissions.unwrap_or_default()),
            (None, Some(user)) => (user, Permissions::NONE),
            (None, None) => return Err(ParseError::MissingField("user")),
        };

        let guild = match (self.guild_id, self.channel_id) {
            (Some(guild_id), Some(_)) => Some(GuildScope {
                guild_id,
                bot_permissions: self.app_permissions.unwrap_or_default(),
                author_permissions,
            }),
            _ => None,
        };

        let data = self.data.ok_or(ParseError::MissingField("data"))?;
        let data = match self.kind {
            TYPE_COMMAND => InteractionData::Command(parse_command(data)?),
            TYPE_COMPONENT => {
                let raw: RawComponentData = serde_json::from_value(data)
                    .map_err(|e| ParseError::invalid("data", e.to_string()))?;
                let component = ComponentData {
                    custom_id: raw.custom_id,
                    values: raw.values,
                    message_id: self.message.map(|m| m.id),
                };
                match raw.component_type {
                    COMPONENT_BUTTON => InteractionData::Button(component),
                    COMPONENT_STRING_SELECT => InteractionData::SelectMenu(component),
                    other => {
                        return Err(ParseError::Unsupported {
                            interaction_type: self.kind,
                            component_type: Some(other),
                        });
                    }
                }
            }
            TYPE_AUTOCOMPLETE => InteractionData::Autocomplete(parse_autocomplete(data)?),
            other => {
                return Err(ParseError::Unsupported {
                    interaction_type: other,
                    component_type: None,
                });
            }
        };

        Ok(Interaction {
            id: self.id,
            token: self.token,
            user,
            channel_id: self.channel_id,
            guild,
            data,
        })
    }
}

fn parse_command(data: Value) -> ParseResult<CommandData> {
    let raw: RawCommandData =
        serde_json::from_value(data).map_err(|e| ParseError::invalid("data", e.to_string()))?;
    let options = raw
        .options
        .into_iter()
        .filter_map(|o| convert_option(o).transpose())
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(CommandData {
        name: raw.name,
        options,
    })
}

fn parse_autocomplete(data: Value) -> ParseResult<AutocompleteData> {
    let raw: RawCommandData =
        serde_json::from_value(data).map_err(|e| ParseError::invalid("data", e.to_string()))?;

    let mut focused = None;
    let mut options = Vec::new();
    for option in raw.options {
        if option.focused {
            // Partial input arrives as a string even for numeric options.
            let value = match &option.value {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            focused = Some(FocusedOption {
                name: option.name,
                value,
            });
        } else if let Some(converted) = convert_option(option)? {
            options.push(converted);
        }
    }

    Ok(AutocompleteData {
        command_name: raw.name,
        focused: focused.ok_or(ParseError::MissingField("focused"))?,
        options,
    })
}

/// Converts a raw option. Options without a value (sub-command groups) and
/// unhandled option types are skipped.
fn convert_option(raw: RawOption) -> ParseResult<Option<CommandOption>> {
    let Some(value) = raw.value else {
        return Ok(None);
    };
    let value = match (raw.kind, value) {
        (OPTION_STRING, Value::String(s)) => OptionValue::String(s),
        (OPTION_INTEGER, Value::Number(n)) => OptionValue::Integer(
            n.as_i64()
                .ok_or_else(|| ParseError::invalid("options", format!("`{}` is not an integer", raw.name)))?,
        ),
        (OPTION_NUMBER, Value::Number(n)) => OptionValue::Number(n.as_f64().unwrap_or_default()),
        (OPTION_BOOLEAN, Value::Bool(b)) => OptionValue::Boolean(b),
        (OPTION_USER, Value::String(s)) => OptionValue::User(
            s.parse()
                .map_err(|_| ParseError::invalid("options", format!("`{}` is not a user id", raw.name)))?,
        ),
        (OPTION_STRING | OPTION_INTEGER | OPTION_NUMBER | OPTION_BOOLEAN | OPTION_USER, _) => {
            return Err(ParseError::invalid(
                "options",
                format!("`{}` has a value of the wrong type", raw.name),
            ));
        }
        _ => return Ok(None),
    };
    Ok(Some(CommandOption {
        name: raw.name,
        value,
    }))
}
