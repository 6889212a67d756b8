//! Text command surface.

use thiserror::Error;
use world_level_core::ActorId;
use world_level_system_reroll::RerollDenial;

/// Player issuing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invoker {
    /// Account of the player.
    pub actor: ActorId,
    /// Name shown to other players.
    pub name: String,
    /// Whether the player holds the admin permission.
    pub is_admin: bool,
}

impl Invoker {
    /// Creates a player without admin rights.
    #[must_use]
    pub fn player(actor: ActorId, name: impl Into<String>) -> Self {
        Self {
            actor,
            name: name.into(),
            is_admin: false,
        }
    }

    /// Creates a player with admin rights.
    #[must_use]
    pub fn admin(actor: ActorId, name: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::player(actor, name)
        }
    }
}

/// Why a reroll was refused. Nothing changes when a reroll is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RerollError {
    /// There is nothing to reroll.
    #[error("There is no active task to reroll!")]
    NoActiveTask,
    /// The cooldown or the daily cap applies.
    #[error("{0}")]
    Limited(RerollDenial),
    /// The economy refused the fee.
    #[error("You need {cost} {currency} to reroll the task!")]
    InsufficientFunds {
        /// Fee that was refused.
        cost: u64,
        /// Currency name.
        currency: String,
    },
}

/// Why a command was not executed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The first word is not a command.
    #[error("Unknown command. Use /worldlevel help for commands.")]
    Unknown {
        /// Word that was not recognised.
        command: String,
    },
    /// `admin` was given without a subcommand.
    #[error("Invalid admin command. Use /worldlevel help for commands.")]
    MissingAdminCommand,
    /// The admin subcommand is not recognised.
    #[error("Unknown admin command. Use /worldlevel help for commands.")]
    UnknownAdmin {
        /// Word that was not recognised.
        command: String,
    },
    /// An argument is missing or malformed.
    #[error("Usage: {usage}")]
    Usage {
        /// Expected form of the command.
        usage: &'static str,
    },
    /// A player without admin rights used an admin command.
    #[error("You don't have permission to use admin commands!")]
    PermissionDenied,
    /// The reroll was refused.
    #[error(transparent)]
    Reroll(#[from] RerollError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorldLevelCommand {
    Help,
    Status,
    Task,
    Reroll,
    Admin(AdminCommand),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AdminCommand {
    SetLevel(u32),
    AddXp(u64),
    NewTask,
    UpdateXp,
}

/// Parses the words following `/wl`. No words means `status`.
pub(crate) fn parse(args: &[&str], is_admin: bool) -> Result<WorldLevelCommand, CommandError> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(WorldLevelCommand::Status);
    };

    match first.to_ascii_lowercase().as_str() {
        "help" => Ok(WorldLevelCommand::Help),
        "status" => Ok(WorldLevelCommand::Status),
        "task" => Ok(WorldLevelCommand::Task),
        "reroll" => Ok(WorldLevelCommand::Reroll),
        "admin" if !is_admin => Err(CommandError::PermissionDenied),
        "admin" => parse_admin(rest).map(WorldLevelCommand::Admin),
        _ => Err(CommandError::Unknown {
            command: (*first).to_owned(),
        }),
    }
}

fn parse_admin(args: &[&str]) -> Result<AdminCommand, CommandError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(CommandError::MissingAdminCommand);
    };

    match first.to_ascii_lowercase().as_str() {
        "setlevel" => rest
            .first()
            .and_then(|value| value.parse().ok())
            .map(AdminCommand::SetLevel)
            .ok_or(CommandError::Usage {
                usage: "/wl admin setlevel <level>",
            }),
        "addxp" => rest
            .first()
            .and_then(|value| value.parse().ok())
            .map(AdminCommand::AddXp)
            .ok_or(CommandError::Usage {
                usage: "/wl admin addxp <amount>",
            }),
        "newtask" => Ok(AdminCommand::NewTask),
        "updatexp" => Ok(AdminCommand::UpdateXp),
        _ => Err(CommandError::UnknownAdmin {
            command: (*first).to_owned(),
        }),
    }
}
