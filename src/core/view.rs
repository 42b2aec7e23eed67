//! # Navigation
//!
//! Which of the three screens is mounted. Switching is a plain value
//! replacement; nothing else happens on a switch.

use std::fmt;

/// The three screens of the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Chat,
    Code,
    Reminders,
}

impl View {
    /// All screens, in sidebar order.
    pub const ALL: [View; 3] = [View::Chat, View::Code, View::Reminders];

    /// Stable identifier, as used by `start_view` and `--view`.
    pub fn id(self) -> &'static str {
        match self {
            View::Chat => "chat",
            View::Code => "code",
            View::Reminders => "reminders",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Code => "Code",
            View::Reminders => "Reminders",
        }
    }

    /// Resolve an identifier. Anything unrecognized lands on the chat screen.
    pub fn from_id(id: &str) -> View {
        match id {
            "code" => View::Code,
            "reminders" => View::Reminders,
            _ => View::Chat,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_chat() {
        assert_eq!(View::default(), View::Chat);
    }

    #[test]
    fn test_from_id_round_trips_known_ids() {
        for view in View::ALL {
            assert_eq!(View::from_id(view.id()), view);
        }
    }

    #[test]
    fn test_unknown_id_falls_back_to_chat() {
        assert_eq!(View::from_id("settings"), View::Chat);
        assert_eq!(View::from_id(""), View::Chat);
        assert_eq!(View::from_id("Code"), View::Chat);
    }
}
