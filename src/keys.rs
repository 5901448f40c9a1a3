use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// Keys that never reach the scoring engine: modifiers, navigation and
/// editing keys other than backspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum IgnoredKey {
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    Tab,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Function,
    Other,
}

/// A single key identifier from the keyboard-event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Ignored(IgnoredKey),
}

impl Key {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Key::Ignored(_))
    }

    /// Parse a DOM-style key name such as `"a"`, `" "`, `"Backspace"` or `"Shift"`.
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c);
        }

        let ignored = match name {
            "Backspace" => return Key::Backspace,
            "Space" | "Spacebar" => return Key::Char(' '),
            "Shift" => IgnoredKey::Shift,
            "Control" => IgnoredKey::Control,
            "Alt" | "AltGraph" => IgnoredKey::Alt,
            "Meta" | "OS" => IgnoredKey::Meta,
            "CapsLock" => IgnoredKey::CapsLock,
            "Tab" => IgnoredKey::Tab,
            "Enter" => IgnoredKey::Enter,
            "Escape" | "Esc" => IgnoredKey::Escape,
            "ArrowUp" => IgnoredKey::ArrowUp,
            "ArrowDown" => IgnoredKey::ArrowDown,
            "ArrowLeft" => IgnoredKey::ArrowLeft,
            "ArrowRight" => IgnoredKey::ArrowRight,
            "Home" => IgnoredKey::Home,
            "End" => IgnoredKey::End,
            "PageUp" => IgnoredKey::PageUp,
            "PageDown" => IgnoredKey::PageDown,
            "Insert" => IgnoredKey::Insert,
            "Delete" => IgnoredKey::Delete,
            f if f.starts_with('F') && f[1..].parse::<u8>().is_ok() => IgnoredKey::Function,
            _ => IgnoredKey::Other,
        };

        Key::Ignored(ignored)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        // chords are shortcuts, not text
        if event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::META)
        {
            return Key::Ignored(if event.modifiers.contains(KeyModifiers::CONTROL) {
                IgnoredKey::Control
            } else if event.modifiers.contains(KeyModifiers::ALT) {
                IgnoredKey::Alt
            } else {
                IgnoredKey::Meta
            });
        }

        match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Enter => Key::Ignored(IgnoredKey::Enter),
            KeyCode::Tab | KeyCode::BackTab => Key::Ignored(IgnoredKey::Tab),
            KeyCode::Esc => Key::Ignored(IgnoredKey::Escape),
            KeyCode::Up => Key::Ignored(IgnoredKey::ArrowUp),
            KeyCode::Down => Key::Ignored(IgnoredKey::ArrowDown),
            KeyCode::Left => Key::Ignored(IgnoredKey::ArrowLeft),
            KeyCode::Right => Key::Ignored(IgnoredKey::ArrowRight),
            KeyCode::Home => Key::Ignored(IgnoredKey::Home),
            KeyCode::End => Key::Ignored(IgnoredKey::End),
            KeyCode::PageUp => Key::Ignored(IgnoredKey::PageUp),
            KeyCode::PageDown => Key::Ignored(IgnoredKey::PageDown),
            KeyCode::Insert => Key::Ignored(IgnoredKey::Insert),
            KeyCode::Delete => Key::Ignored(IgnoredKey::Delete),
            KeyCode::F(_) => Key::Ignored(IgnoredKey::Function),
            KeyCode::CapsLock => Key::Ignored(IgnoredKey::CapsLock),
            KeyCode::Modifier(m) => Key::Ignored(IgnoredKey::from(m)),
            _ => Key::Ignored(IgnoredKey::Other),
        }
    }
}

impl From<ModifierKeyCode> for IgnoredKey {
    fn from(code: ModifierKeyCode) -> Self {
        use ModifierKeyCode::*;
        match code {
            LeftShift | RightShift | IsoLevel5Shift => IgnoredKey::Shift,
            LeftControl | RightControl => IgnoredKey::Control,
            // AltGr arrives as level 3 shift
            LeftAlt | RightAlt | IsoLevel3Shift => IgnoredKey::Alt,
            LeftSuper | RightSuper | LeftHyper | RightHyper | LeftMeta | RightMeta => {
                IgnoredKey::Meta
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_characters_are_typed() {
        assert_eq!(Key::from_name("a"), Key::Char('a'));
        assert_eq!(Key::from_name(" "), Key::Char(' '));
        assert_eq!(Key::from_name("é"), Key::Char('é'));
    }

    #[test]
    fn named_keys() {
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("Shift"), Key::Ignored(IgnoredKey::Shift));
        assert_eq!(Key::from_name("ArrowLeft"), Key::Ignored(IgnoredKey::ArrowLeft));
        assert_eq!(Key::from_name("F12"), Key::Ignored(IgnoredKey::Function));
        assert_eq!(Key::from_name("Dead"), Key::Ignored(IgnoredKey::Other));
    }

    #[test]
    fn crossterm_events() {
        let plain = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(Key::from(plain), Key::Char('x'));

        // shifted characters arrive already upper-cased
        let shifted = KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT);
        assert_eq!(Key::from(shifted), Key::Char('X'));

        let chord = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Key::from(chord), Key::Ignored(IgnoredKey::Control));

        let back = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(Key::from(back), Key::Backspace);

        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert!(Key::from(up).is_ignored());
    }

    #[test]
    fn modifier_presses_keep_their_identity() {
        let press = |m| Key::from(KeyEvent::new(KeyCode::Modifier(m), KeyModifiers::NONE));

        assert_eq!(press(ModifierKeyCode::LeftShift), Key::Ignored(IgnoredKey::Shift));
        assert_eq!(press(ModifierKeyCode::RightControl), Key::Ignored(IgnoredKey::Control));
        assert_eq!(press(ModifierKeyCode::LeftAlt), Key::Ignored(IgnoredKey::Alt));
        assert_eq!(press(ModifierKeyCode::IsoLevel3Shift), Key::Ignored(IgnoredKey::Alt));
        assert_eq!(press(ModifierKeyCode::LeftSuper), Key::Ignored(IgnoredKey::Meta));
        assert_eq!(press(ModifierKeyCode::RightMeta), Key::Ignored(IgnoredKey::Meta));
    }

    #[test]
    fn ignored_key_display() {
        assert_eq!(IgnoredKey::CapsLock.to_string(), "CapsLock");
    }
}
