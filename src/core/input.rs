use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Backend-independent key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Alt(char),
    F(u8),
    Esc,
    Enter,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Null,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Ctrl(c) => write!(f, "C-{}", c),
            Key::Alt(c) => write!(f, "M-{}", c),
            Key::F(n) => write!(f, "F{}", n),
            Key::Esc => write!(f, "ESC"),
            Key::Enter => write!(f, "RET"),
            Key::Backspace => write!(f, "BS"),
            Key::Tab => write!(f, "TAB"),
            Key::BackTab => write!(f, "S-TAB"),
            Key::Delete => write!(f, "DEL"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PgUp"),
            Key::PageDown => write!(f, "PgDn"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Null => write!(f, "NUL"),
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl FromStr for Key {
    type Err = String;

    /// Parses `^X`, `C-x`, `M-x`, `ESC-x`, `F5` and the named keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.strip_prefix('^').and_then(single_char) {
            return Ok(Key::Ctrl(c.to_ascii_lowercase()));
        }
        if let Some(c) = s.strip_prefix("C-").and_then(single_char) {
            return Ok(Key::Ctrl(c.to_ascii_lowercase()));
        }
        if let Some(c) = s
            .strip_prefix("M-")
            .or_else(|| s.strip_prefix("ESC-"))
            .and_then(single_char)
        {
            return Ok(Key::Alt(c.to_ascii_lowercase()));
        }

        match s.to_ascii_uppercase().as_str() {
            "ENTER" | "RET" => Ok(Key::Enter),
            "TAB" => Ok(Key::Tab),
            "BACKTAB" => Ok(Key::BackTab),
            "BACKSPACE" | "BS" => Ok(Key::Backspace),
            "ESC" => Ok(Key::Esc),
            "DELETE" | "DEL" => Ok(Key::Delete),
            "HOME" => Ok(Key::Home),
            "END" => Ok(Key::End),
            "PAGEUP" | "PGUP" => Ok(Key::PageUp),
            "PAGEDOWN" | "PGDN" => Ok(Key::PageDown),
            "UP" => Ok(Key::Up),
            "DOWN" => Ok(Key::Down),
            "LEFT" => Ok(Key::Left),
            "RIGHT" => Ok(Key::Right),
            "NUL" | "NULL" => Ok(Key::Null),
            _ => {
                if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=24).contains(&n) {
                        return Ok(Key::F(n));
                    }
                }
                // raw characters keep their case
                single_char(s)
                    .map(Key::Char)
                    .ok_or_else(|| format!("Unknown key: {}", s))
            }
        }
    }
}

/// A key press with its modifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl InputEvent {
    /// Key without modifiers
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            alt: false,
            ctrl: false,
        }
    }
}

/// Result of a key lookup in the trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Found a complete command binding
    Command(String),
    /// Found a prefix, more keys needed
    Prefix,
    /// No matching binding found (dead end)
    DeadEnd,
    /// Key should be inserted as a character
    InsertChar(char),
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    command: Option<String>,
    children: HashMap<KeyInput, TrieNode>,
}

/// Normalized key input for trie lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyInput {
    /// Letters are matched case-insensitively; Shift only counts for non-character keys
    pub fn from_event(event: &InputEvent) -> Self {
        let (key, shift) = match &event.key {
            Key::Char(c) => (Key::Char(c.to_ascii_lowercase()), false),
            Key::Alt(c) => (Key::Alt(c.to_ascii_lowercase()), false),
            Key::Ctrl(c) => (Key::Ctrl(c.to_ascii_lowercase()), false),
            other => (other.clone(), event.shift),
        };
        Self {
            ctrl: matches!(key, Key::Ctrl(_)) || (event.ctrl && !matches!(key, Key::Char(_))),
            alt: matches!(key, Key::Alt(_)) || (event.alt && !matches!(key, Key::Char(_))),
            key,
            shift,
        }
    }

    /// Parse one binding token like `^X`, `ESC-s`, `S-F6` or `C-Right`
    pub fn parse(s: &str) -> Option<Self> {
        let (shift, rest) = match s.strip_prefix("S-") {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, s),
        };
        // C-<named key>, e.g. C-Right; C-<char> is handled by Key::from_str
        if let Some(named) = rest.strip_prefix("C-").filter(|n| n.chars().count() > 1) {
            let key = Key::from_str(named).ok()?;
            return Some(Self {
                key,
                shift,
                ctrl: true,
                alt: false,
            });
        }
        let key = Key::from_str(rest).ok()?;
        Some(Self {
            ctrl: matches!(key, Key::Ctrl(_)),
            alt: matches!(key, Key::Alt(_)),
            key,
            shift,
        })
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shift {
            write!(f, "S-")?;
        }
        match self.key {
            Key::Ctrl(_) | Key::Alt(_) => write!(f, "{}", self.key),
            _ if self.ctrl => write!(f, "C-{}", self.key),
            _ => write!(f, "{}", self.key),
        }
    }
}

/// Trie of key sequences to command names
#[derive(Default)]
pub struct KeyTrie {
    root: TrieNode,
    /// Keys of the sequence typed so far
    current: Vec<KeyInput>,
}

impl KeyTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding; tokens that do not parse make the whole binding invalid
    pub fn insert(&mut self, sequence: &[&str], command: String) -> bool {
        let Some(keys) = sequence
            .iter()
            .map(|token| KeyInput::parse(token))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };
        if keys.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        node.command = Some(command);
        true
    }

    /// Advance the current sequence by one key press
    pub fn process_key(&mut self, input_event: &InputEvent) -> LookupResult {
        self.current.push(KeyInput::from_event(input_event));

        let mut node = Some(&self.root);
        for key in &self.current {
            node = node.and_then(|n| n.children.get(key));
        }

        if let Some(node) = node {
            if let Some(cmd) = &node.command {
                let result = LookupResult::Command(cmd.clone());
                self.current.clear();
                return result;
            }
            if !node.children.is_empty() {
                return LookupResult::Prefix;
            }
        }

        let partial = self.current.len() > 1;
        self.current.clear();
        // an unbound plain character typed outside a sequence is self-inserted, case intact
        if let Key::Char(c) = input_event.key {
            if !partial && !input_event.ctrl && !input_event.alt {
                return LookupResult::InsertChar(c);
            }
        }
        LookupResult::DeadEnd
    }

    /// The pending partial sequence, e.g. `ESC -`
    pub fn current_sequence(&self) -> String {
        if self.current.is_empty() {
            return String::new();
        }
        self.current
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" ")
            + " -"
    }
}
