//! Player wrappers: the mutation surface for player-controlled characters.
//!
//! Every mutation goes through a [`PlayerHandle`] and follows the same
//! local-first shape: apply the change to the local module immediately,
//! then forward it to the server when a session is attached. Forwarding
//! failures are logged, never raised — the authority corrects any
//! divergence through later snapshots.

use embershell_engine::{Character, Equipable, ObjectRef, Usable};

use crate::error::GameError;
use crate::game::Game;

/// Chat-log key shown when the local simulation rejects a use action.
/// Untranslated — the presentation layer runs it through the lang table.
const CANT_DO_MSG: &str = "cant_do_right_now";

/// One player-controlled character, tracked by reference.
///
/// The character itself lives inside the module and may be replaced
/// wholesale by a snapshot; the wrapper re-resolves it by ID + serial
/// on every access, so replacement is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    character: ObjectRef,
}

impl Player {
    pub fn new(character: ObjectRef) -> Self {
        Self { character }
    }

    pub fn character(&self) -> &ObjectRef {
        &self.character
    }

    pub fn id(&self) -> &str {
        &self.character.id
    }

    pub fn serial(&self) -> &str {
        &self.character.serial
    }
}

/// A borrowed handle pairing one player with the facade.
///
/// Obtained from [`Game::active_player`] or [`Game::player`]; holds the
/// facade mutably for its lifetime, so handle operations and snapshot
/// reconciliation can never interleave.
pub struct PlayerHandle<'a> {
    pub(crate) character: ObjectRef,
    pub(crate) game: &'a mut Game,
}

impl PlayerHandle<'_> {
    /// Reference to the wrapped character.
    pub fn character_ref(&self) -> &ObjectRef {
        &self.character
    }

    /// The wrapped character, if it is still present in the module.
    pub fn character(&self) -> Option<&Character> {
        self.game
            .module()?
            .character(&self.character.id, &self.character.serial)
    }

    fn character_mut(&mut self) -> Option<&mut Character> {
        self.game
            .module_mut()?
            .character_mut(&self.character.id, &self.character.serial)
    }

    /// Sets the destination point the character walks toward and
    /// forwards the move.
    pub async fn set_dest_point(&mut self, x: f32, y: f32) {
        let Some(character) = self.character_mut() else {
            tracing::warn!(player = %self.character, "player character missing from module");
            return;
        };
        character.set_dest_point(x, y);
        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .move_to(&self.character.id, &self.character.serial, x, y)
                .await
            {
                tracing::error!(error = %e, "unable to forward move");
            }
        }
    }

    /// Appends a translated message to the chat log and forwards it.
    pub async fn add_chat_message(&mut self, text: &str) {
        let Some(character) = self.character_mut() else {
            tracing::warn!(player = %self.character, "player character missing from module");
            return;
        };
        character.add_chat_message(text, true);
        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .chat(&self.character.id, &self.character.serial, text)
                .await
            {
                tracing::error!(error = %e, "unable to forward chat message");
            }
        }
    }

    /// Sets or clears the character's target and forwards the change.
    pub async fn set_target(&mut self, target: Option<ObjectRef>) {
        let Some(character) = self.character_mut() else {
            tracing::warn!(player = %self.character, "player character missing from module");
            return;
        };
        character.set_target(target.clone());
        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .target(&self.character.id, &self.character.serial, target)
                .await
            {
                tracing::error!(error = %e, "unable to forward target change");
            }
        }
    }

    /// Activates a usable object.
    ///
    /// A local rejection (not usable, still on cooldown) only leaves a
    /// note in the chat log and is *not* forwarded; an accepted use is.
    pub async fn use_object(&mut self, object: &(dyn Usable + Sync)) {
        let Some(character) = self.character_mut() else {
            tracing::warn!(player = %self.character, "player character missing from module");
            return;
        };
        if let Err(e) = character.use_object(object) {
            tracing::info!(object = object.id(), error = %e, "use action rejected");
            character.add_chat_message(CANT_DO_MSG, false);
            return;
        }
        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .use_object(
                    &self.character.id,
                    &self.character.serial,
                    object.id(),
                    object.serial(),
                )
                .await
            {
                tracing::error!(error = %e, "unable to forward use action");
            }
        }
    }

    /// Equips an object into free slots of the kinds it requires.
    ///
    /// All-or-nothing: if any required slot kind has no free slot, every
    /// slot filled so far is rolled back before the error returns, and
    /// nothing is forwarded. On success the server receives the exact
    /// slot list that was filled.
    ///
    /// # Errors
    /// [`GameError::RequirementsNotMet`], [`GameError::NoValidSlot`],
    /// [`GameError::NoFreeSlot`], or [`GameError::CharacterNotFound`].
    pub async fn equip(
        &mut self,
        object: &(dyn Equipable + Sync),
    ) -> Result<(), GameError> {
        let item_ref = object.object_ref();
        let player = self.character.clone();
        let Some(character) = self.character_mut() else {
            return Err(GameError::CharacterNotFound(player));
        };
        if !character.meets_reqs(object.equip_reqs()) {
            return Err(GameError::RequirementsNotMet);
        }
        if object.slots().is_empty() {
            return Err(GameError::NoValidSlot);
        }

        let mut used = Vec::with_capacity(object.slots().len());
        for &kind in object.slots() {
            let free = character
                .equipment_mut()
                .slots_mut()
                .iter_mut()
                .enumerate()
                .find(|(_, s)| s.kind() == kind && s.item().is_none());
            match free {
                Some((index, slot)) => {
                    slot.set_item(Some(item_ref.clone()));
                    used.push((kind, index));
                }
                None => {
                    character.equipment_mut().unequip(object);
                    return Err(GameError::NoFreeSlot(kind));
                }
            }
        }

        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .equip(&player.id, &player.serial, item_ref, used)
                .await
            {
                tracing::error!(error = %e, "unable to forward equip");
            }
        }
        Ok(())
    }

    /// Removes an object from every slot it occupies and forwards the
    /// change. Always succeeds locally.
    pub async fn unequip(&mut self, object: &(dyn Equipable + Sync)) {
        let item_ref = object.object_ref();
        let Some(character) = self.character_mut() else {
            tracing::warn!(player = %self.character, "player character missing from module");
            return;
        };
        character.equipment_mut().unequip(object);
        if let Some(session) = self.game.session_arc() {
            if let Err(e) = session
                .unequip(&self.character.id, &self.character.serial, item_ref)
                .await
            {
                tracing::error!(error = %e, "unable to forward unequip");
            }
        }
    }
}
