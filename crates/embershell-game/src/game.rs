//! The game facade: local module state, player wrappers, and the
//! optional remote session.
//!
//! One facade instance is shared by the command loop, the simulation
//! tick task, and the reconciler task, behind one `Arc<Mutex<Game>>`.
//! The mutex makes the ordering explicit: a snapshot is never applied
//! halfway through a player mutation and vice versa.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use embershell_engine::{
    Ai, Character, CharacterData, Container, Module, ObjectRef,
};
use embershell_net::Session;
use embershell_protocol::{Response, TransferItems};

use crate::error::GameError;
use crate::player::{Player, PlayerHandle};

/// Where the server handshake currently stands.
///
/// Only meaningful while a session is attached; local-authority games
/// sit at [`Acknowledged`](Self::Acknowledged) from the start.
///
/// ```text
/// Pending --(response with logon=false)--> Acknowledged
/// Pending --(logon response with errors)--> Failed
/// ```
///
/// A logon response *without* errors is a handshake echo, not
/// completion — the status stays pending until the first regular
/// response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Pending,
    Acknowledged,
    Failed,
}

/// Client-side game state and its synchronization entry points.
pub struct Game {
    module: Option<Module>,
    players: Vec<Player>,
    active: Option<usize>,
    session: Option<Arc<Session>>,
    login: LoginStatus,
    /// Character to spawn once the server acknowledges login and a
    /// module snapshot is present. Cleared on login failure.
    pending_player: Option<CharacterData>,
    ai: Ai,
}

impl Game {
    /// Builds a facade around an optional starting module.
    ///
    /// Server-driven games start with `None` and receive their module
    /// through the first snapshot.
    pub fn new(module: Option<Module>) -> Self {
        Self {
            module,
            players: Vec::new(),
            active: None,
            session: None,
            login: LoginStatus::Acknowledged,
            pending_player: None,
            ai: Ai::new(),
        }
    }

    pub fn module(&self) -> Option<&Module> {
        self.module.as_ref()
    }

    pub fn module_mut(&mut self) -> Option<&mut Module> {
        self.module.as_mut()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn login_status(&self) -> LoginStatus {
        self.login
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    pub(crate) fn session_arc(&self) -> Option<Arc<Session>> {
        self.session.as_ref().map(Arc::clone)
    }

    // -----------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------

    /// Registers a player wrapper and marks it active.
    pub fn add_player(&mut self, player: Player) {
        tracing::info!(character = %player.character(), "player added");
        self.players.push(player);
        self.active = Some(self.players.len() - 1);
    }

    /// Marks the player wrapping the given character active.
    /// Returns `false` if no such player exists.
    pub fn set_active_player(&mut self, character: &ObjectRef) -> bool {
        match self
            .players
            .iter()
            .position(|p| p.character() == character)
        {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn active_player_ref(&self) -> Option<&Player> {
        self.players.get(self.active?)
    }

    /// Mutation handle for the active player.
    pub fn active_player(&mut self) -> Option<PlayerHandle<'_>> {
        let character = self.active_player_ref()?.character().clone();
        Some(PlayerHandle {
            character,
            game: self,
        })
    }

    /// Mutation handle for the player wrapping the given character.
    pub fn player(&mut self, character: &ObjectRef) -> Option<PlayerHandle<'_>> {
        let player = self.players.iter().find(|p| p.character() == character)?;
        let character = player.character().clone();
        Some(PlayerHandle {
            character,
            game: self,
        })
    }

    /// Creates a character in the chapter's start area, at the start
    /// position, and registers it as the active player.
    ///
    /// # Errors
    /// [`GameError::NoModule`] without a module,
    /// [`GameError::StartAreaNotFound`] if the chapter's start area does
    /// not exist.
    pub fn spawn_player(
        &mut self,
        data: CharacterData,
    ) -> Result<ObjectRef, GameError> {
        let module = self.module.as_mut().ok_or(GameError::NoModule)?;
        let mut character = Character::new(data);
        character.set_position(module.chapter().start_pos());

        let start_area = module.chapter().start_area().to_string();
        let area = module
            .chapter_mut()
            .area_mut(&start_area)
            .ok_or(GameError::StartAreaNotFound(start_area))?;
        let character_ref = character.object_ref();
        area.add_character(character);

        self.add_player(Player::new(character_ref.clone()));
        Ok(character_ref)
    }

    /// Stores a character to spawn when the server login completes.
    pub fn set_pending_player(&mut self, data: CharacterData) {
        self.pending_player = Some(data);
    }

    pub(crate) fn pending_player_mut(&mut self) -> &mut Option<CharacterData> {
        &mut self.pending_player
    }

    // -----------------------------------------------------------------
    // Server attachment
    // -----------------------------------------------------------------

    /// Attaches a server session to the shared facade.
    ///
    /// Spawns the reconciler task, which drains the response queue
    /// strictly in order, then requests an initial module snapshot. The
    /// login status moves to [`LoginStatus::Pending`] until the server
    /// acknowledges.
    pub async fn set_server(
        game: &Arc<Mutex<Game>>,
        session: Session,
        mut responses: mpsc::Receiver<Response>,
    ) {
        let session = Arc::new(session);
        {
            let mut g = game.lock().await;
            g.session = Some(Arc::clone(&session));
            g.login = LoginStatus::Pending;
        }

        let reconciler = Arc::clone(game);
        tokio::spawn(async move {
            while let Some(response) = responses.recv().await {
                reconciler.lock().await.handle_response(response).await;
            }
            tracing::debug!("response queue closed, reconciler finished");
        });

        if let Err(e) = session.update().await {
            tracing::error!(error = %e, "unable to request initial snapshot");
        }
    }

    // -----------------------------------------------------------------
    // World mutations spanning characters
    // -----------------------------------------------------------------

    /// Moves items between two characters' inventories, item by item.
    ///
    /// A missing item aborts the remaining moves but keeps the earlier
    /// ones; whatever actually moved is forwarded as one batched
    /// transfer.
    ///
    /// # Errors
    /// [`GameError::ItemNotFound`] names the first item missing from the
    /// source inventory.
    pub async fn transfer_items(
        &mut self,
        from: &ObjectRef,
        to: &ObjectRef,
        items: &[ObjectRef],
    ) -> Result<(), GameError> {
        let module = self.module.as_mut().ok_or(GameError::NoModule)?;
        if module.character(&from.id, &from.serial).is_none() {
            return Err(GameError::CharacterNotFound(from.clone()));
        }
        if module.character(&to.id, &to.serial).is_none() {
            return Err(GameError::CharacterNotFound(to.clone()));
        }

        let (moved, failure) = move_items(module, from, to, items, true);

        if !moved.is_empty() {
            if let Some(session) = self.session_arc() {
                if let Err(e) = session
                    .transfer_items(from.clone(), to.clone(), group_by_id(&moved))
                    .await
                {
                    tracing::error!(error = %e, "unable to forward item transfer");
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Executes a trade: `sell_items` move from buyer to seller,
    /// `buy_items` from seller to buyer.
    ///
    /// The local effect is unconditional — no value check, no consent
    /// protocol; acceptance already happened at the presentation layer.
    /// Items missing from their source are skipped with a log entry.
    /// Both halves are forwarded as one batched trade.
    ///
    /// # Errors
    /// [`GameError::NoModule`] without a module.
    pub async fn trade(
        &mut self,
        seller: &ObjectRef,
        buyer: &ObjectRef,
        sell_items: &[ObjectRef],
        buy_items: &[ObjectRef],
    ) -> Result<(), GameError> {
        let module = self.module.as_mut().ok_or(GameError::NoModule)?;

        let (sold, _) = move_items(module, buyer, seller, sell_items, false);
        let (bought, _) = move_items(module, seller, buyer, buy_items, false);

        if sold.is_empty() && bought.is_empty() {
            return Ok(());
        }
        if let Some(session) = self.session_arc() {
            let sell = TransferItems {
                from: buyer.clone(),
                to: seller.clone(),
                items: group_by_id(&sold),
            };
            let buy = TransferItems {
                from: seller.clone(),
                to: buyer.clone(),
                items: group_by_id(&bought),
            };
            if let Err(e) = session.trade(sell, buy).await {
                tracing::error!(error = %e, "unable to forward trade");
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------

    /// Restarts a dialog carried by `owner` with `target` as the
    /// interlocutor, and forwards the start.
    ///
    /// # Errors
    /// [`GameError::CharacterNotFound`] or [`GameError::DialogNotFound`].
    pub async fn start_dialog(
        &mut self,
        owner: &ObjectRef,
        target: &ObjectRef,
        dialog_id: &str,
    ) -> Result<(), GameError> {
        let module = self.module.as_mut().ok_or(GameError::NoModule)?;
        let character = module
            .character_mut(&owner.id, &owner.serial)
            .ok_or_else(|| GameError::CharacterNotFound(owner.clone()))?;
        let dialog = character
            .dialogs_mut()
            .iter_mut()
            .find(|d| d.id() == dialog_id)
            .ok_or_else(|| GameError::DialogNotFound(dialog_id.to_string()))?;

        dialog.restart();
        dialog.set_target(Some(target.clone()));
        let dialog_owner = dialog.owner().cloned();

        if let (Some(session), Some(dialog_owner)) =
            (self.session_arc(), dialog_owner)
        {
            if let Err(e) = session
                .start_dialog(dialog_owner, target.clone(), dialog_id)
                .await
            {
                tracing::error!(error = %e, "unable to forward dialog start");
            }
        }
        Ok(())
    }

    /// Advances a running dialog with the given answer and forwards it.
    ///
    /// Forwarding requires both the dialog owner and target to be
    /// resolved; a dialog without a target is local-only.
    ///
    /// # Errors
    /// [`GameError::CharacterNotFound`] or [`GameError::DialogNotFound`].
    pub async fn answer_dialog(
        &mut self,
        owner: &ObjectRef,
        dialog_id: &str,
        answer_id: &str,
    ) -> Result<(), GameError> {
        let module = self.module.as_mut().ok_or(GameError::NoModule)?;
        let character = module
            .character_mut(&owner.id, &owner.serial)
            .ok_or_else(|| GameError::CharacterNotFound(owner.clone()))?;
        let dialog = character
            .dialogs_mut()
            .iter_mut()
            .find(|d| d.id() == dialog_id)
            .ok_or_else(|| GameError::DialogNotFound(dialog_id.to_string()))?;

        dialog.answer(answer_id);
        let dialog_owner = dialog.owner().cloned();
        let dialog_target = dialog.target().cloned();

        if let (Some(session), Some(dialog_owner), Some(dialog_target)) =
            (self.session_arc(), dialog_owner, dialog_target)
        {
            if let Err(e) = session
                .answer_dialog(dialog_owner, dialog_target, dialog_id, answer_id)
                .await
            {
                tracing::error!(error = %e, "unable to forward dialog answer");
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Local simulation
    // -----------------------------------------------------------------

    /// Advances the local simulation by `delta_ms`.
    ///
    /// The module always ticks (cooldowns, movement interpolation). The
    /// AI pass — promoting flagged characters into the registry and
    /// driving them — runs only in local-authority sessions; with a
    /// server attached, NPC behavior comes down in snapshots instead.
    pub fn update(&mut self, delta_ms: u64) {
        let Self {
            module,
            session,
            ai,
            ..
        } = self;
        let Some(module) = module.as_mut() else {
            return;
        };
        module.update(delta_ms);
        if session.is_some() {
            return;
        }
        let flagged: Vec<ObjectRef> = module
            .chapter()
            .areas()
            .iter()
            .flat_map(|a| a.characters())
            .filter(|c| c.ai())
            .map(Character::object_ref)
            .collect();
        for character in flagged {
            ai.add_character(character);
        }
        ai.update(module, delta_ms);
    }

    // -----------------------------------------------------------------
    // Reconciliation hooks used by response handling
    // -----------------------------------------------------------------

    pub(crate) fn set_login(&mut self, status: LoginStatus) {
        self.login = status;
    }

    pub(crate) fn reset_for_load(&mut self, module: Module) {
        self.players.clear();
        self.active = None;
        self.module = Some(module);
    }

    pub(crate) fn merge_snapshot(
        &mut self,
        data: embershell_engine::ModuleData,
    ) {
        match &mut self.module {
            Some(module) => module.apply(data),
            None => self.module = Some(Module::new(data)),
        }
    }
}

/// Moves the listed items from one character's inventory to another's.
///
/// Returns the refs that actually moved, plus the aborting error when
/// `strict` is set. Non-strict mode skips missing items with a log
/// entry and keeps going.
fn move_items(
    module: &mut Module,
    from: &ObjectRef,
    to: &ObjectRef,
    items: &[ObjectRef],
    strict: bool,
) -> (Vec<ObjectRef>, Option<GameError>) {
    let mut moved = Vec::with_capacity(items.len());
    for item_ref in items {
        let Some(source) = module.character_mut(&from.id, &from.serial) else {
            return (moved, Some(GameError::CharacterNotFound(from.clone())));
        };
        let Some(item) = source
            .inventory_mut()
            .remove_item(&item_ref.id, &item_ref.serial)
        else {
            if strict {
                return (moved, Some(GameError::ItemNotFound(item_ref.clone())));
            }
            tracing::warn!(item = %item_ref, "item missing from source, skipping");
            continue;
        };
        let Some(dest) = module.character_mut(&to.id, &to.serial) else {
            // Put the item back rather than losing it.
            if let Some(source) = module.character_mut(&from.id, &from.serial) {
                source.inventory_mut().add_item(item);
            }
            return (moved, Some(GameError::CharacterNotFound(to.clone())));
        };
        dest.inventory_mut().add_item(item);
        moved.push(item_ref.clone());
    }
    (moved, None)
}

/// Groups item refs by ID for the batched wire form.
fn group_by_id(items: &[ObjectRef]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in items {
        grouped
            .entry(item.id.clone())
            .or_default()
            .push(item.serial.clone());
    }
    grouped
}
