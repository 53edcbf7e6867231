//! Shop conversation as an explicit state machine.
//!
//! [`advance`] is pure: it maps the current state and one parsed reply to the
//! next state plus, optionally, an action for the host to carry out (show the
//! stock, run a purchase, ...). Rendering text for the chat platform is the
//! host's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::interaction::InteractionRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ShopDialogue {
    Menu,
    Browsing,
    ConfirmBuy { key: String, quantity: u32 },
    ConfirmSell { uuid: String },
    Closed,
}

impl Default for ShopDialogue {
    fn default() -> Self {
        Self::Menu
    }
}

/// One reply from the user, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopInput {
    Browse,
    Buy { key: String, quantity: u32 },
    Sell { uuid: String },
    Inventory,
    Yes,
    No,
    Back,
    Exit,
    Unknown(String),
}

impl ShopInput {
    /// Parse a reply. Command words are case-insensitive; keys and uuids are kept as typed.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let Some(command) = parts.next() else {
            return ShopInput::Unknown(String::new());
        };
        let args: Vec<&str> = parts.collect();
        match (command.to_lowercase().as_str(), args.as_slice()) {
            ("browse" | "shop" | "list" | "stock", _) => ShopInput::Browse,
            ("buy" | "b", [key]) => ShopInput::Buy {
                key: key.to_string(),
                quantity: 1,
            },
            ("buy" | "b", [key, qty]) => match qty.parse::<u32>() {
                Ok(quantity) if quantity > 0 => ShopInput::Buy {
                    key: key.to_string(),
                    quantity,
                },
                _ => ShopInput::Unknown(text.trim().to_string()),
            },
            ("sell" | "s", [uuid]) => ShopInput::Sell {
                uuid: uuid.to_string(),
            },
            ("inventory" | "inv" | "bag" | "i", _) => ShopInput::Inventory,
            ("yes" | "y" | "confirm", _) => ShopInput::Yes,
            ("no" | "n" | "cancel", _) => ShopInput::No,
            ("back", _) => ShopInput::Back,
            ("exit" | "quit" | "leave" | "q", _) => ShopInput::Exit,
            _ => ShopInput::Unknown(text.trim().to_string()),
        }
    }
}

/// Work the host performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopAction {
    ShowStock,
    ShowInventory,
    Buy { key: String, quantity: u32 },
    Sell { uuid: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueStep {
    pub next: ShopDialogue,
    pub action: Option<ShopAction>,
}

impl DialogueStep {
    fn stay(state: &ShopDialogue) -> Self {
        Self::to(state.clone())
    }

    fn to(next: ShopDialogue) -> Self {
        Self { next, action: None }
    }

    fn with(next: ShopDialogue, action: ShopAction) -> Self {
        Self {
            next,
            action: Some(action),
        }
    }
}

pub fn advance(state: &ShopDialogue, input: ShopInput) -> DialogueStep {
    use ShopDialogue as D;
    use ShopInput as I;

    if matches!(state, D::Closed) {
        return DialogueStep::to(D::Closed);
    }
    if input == I::Exit {
        return DialogueStep::to(D::Closed);
    }

    match (state, input) {
        (D::Menu | D::Browsing, I::Browse) => DialogueStep::with(D::Browsing, ShopAction::ShowStock),
        (D::Menu | D::Browsing, I::Inventory) => {
            DialogueStep::with(state.clone(), ShopAction::ShowInventory)
        }
        (D::Menu | D::Browsing, I::Buy { key, quantity }) => {
            DialogueStep::to(D::ConfirmBuy { key, quantity })
        }
        (D::Menu | D::Browsing, I::Sell { uuid }) => DialogueStep::to(D::ConfirmSell { uuid }),
        (D::Browsing, I::Back) => DialogueStep::to(D::Menu),

        (D::ConfirmBuy { key, quantity }, I::Yes) => DialogueStep::with(
            D::Browsing,
            ShopAction::Buy {
                key: key.clone(),
                quantity: *quantity,
            },
        ),
        (D::ConfirmBuy { .. }, I::No | I::Back) => DialogueStep::to(D::Browsing),

        (D::ConfirmSell { uuid }, I::Yes) => {
            DialogueStep::with(D::Menu, ShopAction::Sell { uuid: uuid.clone() })
        }
        (D::ConfirmSell { .. }, I::No | I::Back) => DialogueStep::to(D::Menu),

        _ => DialogueStep::stay(state),
    }
}

/// Feed a reply to the conversation waiting on `message_id`.
///
/// Returns `None` when nothing is waiting, the entry expired or `author` is
/// not the one being waited on. Unless the conversation closed, it is
/// re-registered under `next_message_id` (the bot's follow-up message).
pub fn continue_dialogue(
    registry: &mut InteractionRegistry<ShopDialogue>,
    message_id: &str,
    author: &str,
    reply: &str,
    next_message_id: &str,
    now: DateTime<Utc>,
) -> Option<DialogueStep> {
    let pending = registry.take(message_id, author, now)?;
    let step = advance(&pending.state, ShopInput::parse(reply));
    if step.next != ShopDialogue::Closed {
        let context: Value = pending.context;
        registry.register(next_message_id, author, step.next.clone(), context, now);
    }
    Some(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parse_commands() {
        assert_eq!(ShopInput::parse("  BROWSE "), ShopInput::Browse);
        assert_eq!(
            ShopInput::parse("buy Carrot_Seed"),
            ShopInput::Buy {
                key: "Carrot_Seed".into(),
                quantity: 1
            }
        );
        assert_eq!(
            ShopInput::parse("buy melon 3"),
            ShopInput::Buy {
                key: "melon".into(),
                quantity: 3
            }
        );
        assert!(matches!(ShopInput::parse("buy melon zero"), ShopInput::Unknown(_)));
        assert!(matches!(ShopInput::parse("buy melon 0"), ShopInput::Unknown(_)));
        assert!(matches!(ShopInput::parse("buy"), ShopInput::Unknown(_)));
        assert_eq!(ShopInput::parse("Y"), ShopInput::Yes);
        assert_eq!(ShopInput::parse(""), ShopInput::Unknown(String::new()));
    }

    #[test]
    fn buy_flow_needs_confirmation() {
        let step = advance(&ShopDialogue::Menu, ShopInput::Browse);
        assert_eq!(step.next, ShopDialogue::Browsing);
        assert_eq!(step.action, Some(ShopAction::ShowStock));

        let step = advance(&step.next, ShopInput::parse("buy melon 2"));
        assert_eq!(
            step.next,
            ShopDialogue::ConfirmBuy {
                key: "melon".into(),
                quantity: 2
            }
        );
        assert_eq!(step.action, None);

        let declined = advance(&step.next, ShopInput::No);
        assert_eq!(declined.next, ShopDialogue::Browsing);
        assert_eq!(declined.action, None);

        let confirmed = advance(&step.next, ShopInput::Yes);
        assert_eq!(
            confirmed.action,
            Some(ShopAction::Buy {
                key: "melon".into(),
                quantity: 2
            })
        );
    }

    #[test]
    fn exit_closes_from_anywhere_and_closed_is_terminal() {
        let states = [
            ShopDialogue::Menu,
            ShopDialogue::Browsing,
            ShopDialogue::ConfirmSell { uuid: "u".into() },
        ];
        for state in states {
            assert_eq!(advance(&state, ShopInput::Exit).next, ShopDialogue::Closed);
        }
        assert_eq!(
            advance(&ShopDialogue::Closed, ShopInput::Browse),
            DialogueStep::to(ShopDialogue::Closed)
        );
    }

    #[test]
    fn unknown_input_keeps_state() {
        let state = ShopDialogue::ConfirmSell { uuid: "u1".into() };
        assert_eq!(advance(&state, ShopInput::parse("huh")).next, state);
    }

    #[test]
    fn continue_dialogue_rebinds_to_follow_up_message() {
        let now = Utc::now();
        let mut reg = InteractionRegistry::with_ttl_secs(60);
        reg.register("m1", "alice", ShopDialogue::Menu, Value::Null, now);

        assert!(continue_dialogue(&mut reg, "m1", "bob", "browse", "m2", now).is_none());

        let step = continue_dialogue(&mut reg, "m1", "alice", "browse", "m2", now).unwrap();
        assert_eq!(step.action, Some(ShopAction::ShowStock));
        assert!(reg.peek("m1").is_none());
        assert_eq!(reg.peek("m2").unwrap().state, ShopDialogue::Browsing);

        let later = now + Duration::seconds(5);
        let step = continue_dialogue(&mut reg, "m2", "alice", "exit", "m3", later).unwrap();
        assert_eq!(step.next, ShopDialogue::Closed);
        assert!(reg.is_empty());
    }
}
