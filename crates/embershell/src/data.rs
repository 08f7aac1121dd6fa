//! Module and save-file handling for local-authority games.
//!
//! A client save is one JSON file holding the full module snapshot plus
//! the list of player character refs; loading rebuilds the module and
//! re-resolves each listed player against it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use embershell_engine::{ModuleData, ObjectRef};

use crate::error::CliError;

pub const SAVE_EXT: &str = "save.json";

/// One client save: which characters were player-controlled, plus the
/// world they were in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSave {
    pub name: String,
    pub players: Vec<ObjectRef>,
    pub module: ModuleData,
}

/// Reads a module data file.
pub fn load_module_data(path: &Path) -> Result<ModuleData, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{SAVE_EXT}"))
}

/// Writes a client save into the saves directory, creating it if
/// needed.
pub fn write_save(dir: &Path, save: &ClientSave) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)?;
    let path = save_path(dir, &save.name);
    let text = serde_json::to_string_pretty(save)?;
    std::fs::write(&path, text)?;
    tracing::debug!(path = %path.display(), "game saved");
    Ok(())
}

/// Reads a client save by name.
pub fn read_save(dir: &Path, name: &str) -> Result<ClientSave, CliError> {
    let text = std::fs::read_to_string(save_path(dir, name))?;
    Ok(serde_json::from_str(&text)?)
}

/// Lists the names of the saves present in the directory.
pub fn list_saves(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let suffix = format!(".{SAVE_EXT}");
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            e.file_name()
                .to_str()
                .and_then(|n| n.strip_suffix(&suffix))
                .map(str::to_string)
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use embershell_engine::ChapterData;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "embershell-test-{}-{tag}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("should create temp dir");
        dir
    }

    fn sample_save(name: &str) -> ClientSave {
        ClientSave {
            name: name.into(),
            players: vec![ObjectRef::new("pc", "0")],
            module: ModuleData {
                id: "testmod".into(),
                chapter: ChapterData {
                    id: "ch1".into(),
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_save_round_trips() {
        let dir = temp_dir("roundtrip");
        let save = sample_save("slot1");

        write_save(&dir, &save).expect("should write");
        let loaded = read_save(&dir, "slot1").expect("should read");

        assert_eq!(loaded.name, "slot1");
        assert_eq!(loaded.players, vec![ObjectRef::new("pc", "0")]);
        assert_eq!(loaded.module.id, "testmod");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_list_saves_strips_extension() {
        let dir = temp_dir("list");
        write_save(&dir, &sample_save("alpha")).expect("should write");
        write_save(&dir, &sample_save("beta")).expect("should write");

        assert_eq!(list_saves(&dir), vec!["alpha", "beta"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_missing_save_fails() {
        let dir = temp_dir("missing");
        assert!(read_save(&dir, "ghost").is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
