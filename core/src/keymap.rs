// Keyboard surface. Keys are matched on their produced character, case
// insensitively, and are ignored while a text input has focus.

/// Session action bound to a key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Space
    TogglePause,
    /// `r`, after confirmation; clears the log
    Reset,
    /// `t`
    ToggleTheme,
    /// `d`
    MarkDiplopia,
}

/// Modifier keys held with the key press
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

/// Map a key press to its command.
///
/// `r` combined with ctrl or meta is left to the host (browser reload).
pub fn command_for(key: &str, modifiers: Modifiers, input_focused: bool) -> Option<Command> {
    if input_focused {
        return None;
    }
    match key.to_lowercase().as_str() {
        " " | "space" => Some(Command::TogglePause),
        "r" if !(modifiers.ctrl || modifiers.meta) => Some(Command::Reset),
        "t" => Some(Command::ToggleTheme),
        "d" => Some(Command::MarkDiplopia),
        _ => None,
    }
}
