//! Line commands understood by the host simulator.

use anyhow::{bail, Context, Result};
use world_level_core::{ActorId, EntityId};

/// One simulated host notification or operator request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Tick,
    Wait {
        seconds: i64,
    },
    Kill {
        actor: ActorId,
        name: String,
        entity: EntityId,
    },
    Spawn {
        actor: ActorId,
        slot: i16,
        entity: EntityId,
    },
    WorldLevel {
        actor: ActorId,
        name: String,
        args: Vec<String>,
    },
    Balance {
        actor: ActorId,
    },
    Quit,
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["tick"] => SessionCommand::Tick,
        ["quit" | "exit"] => SessionCommand::Quit,
        ["wait", seconds] => SessionCommand::Wait {
            seconds: seconds
                .parse()
                .with_context(|| format!("`{seconds}` is not a number of seconds"))?,
        },
        ["kill", actor, name, entity] => SessionCommand::Kill {
            actor: actor_id(actor)?,
            name: (*name).to_owned(),
            entity: entity_id(entity)?,
        },
        ["spawn", actor, slot, entity] => SessionCommand::Spawn {
            actor: actor_id(actor)?,
            slot: slot
                .parse()
                .with_context(|| format!("`{slot}` is not a player slot"))?,
            entity: entity_id(entity)?,
        },
        ["wl", actor, name, args @ ..] => SessionCommand::WorldLevel {
            actor: actor_id(actor)?,
            name: (*name).to_owned(),
            args: args.iter().map(|word| (*word).to_owned()).collect(),
        },
        ["balance", actor] => SessionCommand::Balance {
            actor: actor_id(actor)?,
        },
        _ => bail!("unrecognised line `{line}`"),
    };
    Ok(Some(command))
}

fn actor_id(text: &str) -> Result<ActorId> {
    text.parse()
        .map(ActorId::new)
        .with_context(|| format!("`{text}` is not an actor id"))
}

fn entity_id(text: &str) -> Result<EntityId> {
    text.parse()
        .map(EntityId::new)
        .with_context(|| format!("`{text}` is not an entity id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("   ").expect("blank"), None);
        assert_eq!(parse_line("# setup").expect("comment"), None);
    }

    #[test]
    fn kill_line_carries_actor_name_and_entity() {
        assert_eq!(
            parse_line("kill 3 ana -4").expect("kill"),
            Some(SessionCommand::Kill {
                actor: ActorId::new(3),
                name: "ana".to_owned(),
                entity: EntityId::new(-4),
            })
        );
    }

    #[test]
    fn world_level_line_keeps_remaining_words() {
        assert_eq!(
            parse_line("wl 1 root admin addxp 500").expect("wl"),
            Some(SessionCommand::WorldLevel {
                actor: ActorId::new(1),
                name: "root".to_owned(),
                args: vec!["admin".to_owned(), "addxp".to_owned(), "500".to_owned()],
            })
        );
        assert_eq!(
            parse_line("wl 2 bo").expect("bare wl"),
            Some(SessionCommand::WorldLevel {
                actor: ActorId::new(2),
                name: "bo".to_owned(),
                args: Vec::new(),
            })
        );
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_line("kill one ana 4").is_err());
        assert!(parse_line("spawn 1 99999 4").is_err());
        assert!(parse_line("dance").is_err());
    }
}
