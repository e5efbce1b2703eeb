use crate::core::input::{InputEvent, KeyTrie, LookupResult};

/// KeyBindingManager handles conversion of key events to commands
/// Uses a KeyTrie for multi-key sequence matching
#[derive(Default)]
pub struct KeyBindingManager {
    trie: KeyTrie,
}

impl KeyBindingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key binding from a sequence string like "^X^F" or "ESC-s"
    pub fn bind(&mut self, sequence: &str, command: String) {
        let keys = parse_sequence(sequence);
        let key_refs: Vec<&str> = keys.iter().map(|s| s.as_str()).collect();
        if !self.trie.insert(&key_refs, command.clone()) {
            tracing::warn!(target: "keybinds", sequence, command, "invalid_binding");
        }
    }

    /// Process a key event.
    /// Returns (command_name, char_to_insert, is_complete);
    /// is_complete is false while a multi-key prefix is pending
    pub fn process_key(&mut self, input_event: &InputEvent) -> (Option<String>, Option<char>, bool) {
        match self.trie.process_key(input_event) {
            LookupResult::Command(cmd) => (Some(cmd), None, true),
            LookupResult::Prefix => (None, None, false),
            LookupResult::DeadEnd => (None, None, true),
            LookupResult::InsertChar(c) => (None, Some(c), true),
        }
    }

    /// Get the current partial key sequence for display
    pub fn current_sequence(&self) -> String {
        self.trie.current_sequence()
    }
}

/// Split a binding string into key tokens.
///
/// Tokens are separated by whitespace; runs of control keys may also be
/// written back to back ("^X^F").
fn parse_sequence(sequence: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for token in sequence.split_whitespace() {
        let chars: Vec<char> = token.chars().collect();
        let chained_ctrl = chars.len() > 2
            && chars.len() % 2 == 0
            && chars.chunks(2).all(|pair| pair[0] == '^');
        if chained_ctrl {
            keys.extend(chars.chunks(2).map(|pair| pair.iter().collect::<String>()));
        } else {
            keys.push(token.to_string());
        }
    }
    keys
}
