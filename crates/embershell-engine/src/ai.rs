//! Local AI registry: drives flagged non-player characters when no remote
//! authority is attached.
//!
//! The registry only runs in local-authority sessions — with a server
//! attached, NPC behavior comes down in module snapshots instead.

use crate::data::ObjectRef;
use crate::module::Module;
use crate::traits::Killable;

/// Tracks the characters under local AI control.
#[derive(Debug, Default)]
pub struct Ai {
    characters: Vec<ObjectRef>,
}

impl Ai {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a character for AI control.
    ///
    /// Idempotent: a character already tracked is never re-added.
    pub fn add_character(&mut self, character: ObjectRef) {
        if self.characters.contains(&character) {
            return;
        }
        tracing::debug!(%character, "character under AI control");
        self.characters.push(character);
    }

    pub fn characters(&self) -> &[ObjectRef] {
        &self.characters
    }

    /// One AI pass: dead characters are dropped from the registry, and
    /// characters with a target chase it.
    pub fn update(&mut self, module: &mut Module, _delta_ms: u64) {
        self.characters.retain(|r| {
            module
                .character(&r.id, &r.serial)
                .is_some_and(|c| c.alive())
        });
        for r in &self.characters {
            let Some(target_pos) = module
                .character(&r.id, &r.serial)
                .and_then(|c| c.target().cloned())
                .and_then(|t| module.character(&t.id, &t.serial))
                .map(|t| t.position())
            else {
                continue;
            };
            if let Some(npc) = module.character_mut(&r.id, &r.serial) {
                npc.set_dest_point(target_pos.x, target_pos.y);
            }
        }
    }
}
