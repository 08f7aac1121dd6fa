//! Translation table: key → display text.
//!
//! Untranslated strings (chat-log keys, UI labels) are looked up here
//! before display; unknown keys fall back to the key itself so a
//! missing table never hides a message.

use std::collections::HashMap;
use std::path::Path;

/// One language's translation table.
#[derive(Debug, Default)]
pub struct Lang {
    table: HashMap<String, String>,
}

impl Lang {
    /// Loads a table from a JSON object file. A missing or broken file
    /// yields an empty table with a log entry.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no lang file");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(table) => Self { table },
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "unable to parse lang file");
                Self::default()
            }
        }
    }

    #[cfg(test)]
    fn from_table(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Display text for a key, or the key itself when untranslated.
    pub fn text(&self, key: &str) -> String {
        self.table
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_translates_known_key() {
        let lang = Lang::from_table(HashMap::from([(
            "cant_do_right_now".to_string(),
            "You can't do that right now.".to_string(),
        )]));
        assert_eq!(
            lang.text("cant_do_right_now"),
            "You can't do that right now."
        );
    }

    #[test]
    fn test_text_falls_back_to_key() {
        let lang = Lang::default();
        assert_eq!(lang.text("mystery_key"), "mystery_key");
    }
}
