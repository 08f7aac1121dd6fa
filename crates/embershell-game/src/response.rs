//! Server response reconciliation.
//!
//! Responses are drained from the queue strictly in arrival order and
//! applied in a fixed internal order: login status first, then load,
//! then the module snapshot, then new characters, then errors. New
//! characters have to come after the snapshot — they are resolved
//! against the module the same response just updated.

use embershell_engine::ObjectRef;
use embershell_protocol::{Load, Response};

use crate::game::{Game, LoginStatus};
use crate::player::Player;

impl Game {
    /// Applies one server response to the facade.
    pub async fn handle_response(&mut self, response: Response) {
        self.handle_login(&response);

        if let Some(load) = response.load {
            if !load.save.is_empty() {
                self.handle_load(load).await;
            }
        }
        if let Some(update) = response.update {
            self.merge_snapshot(update.module);
        }
        for data in response.new_chars {
            self.resolve_new_character(data);
        }
        for error in &response.errors {
            tracing::error!(error = %error, "server error");
        }

        self.spawn_pending_player();
    }

    /// Advances the login handshake.
    ///
    /// While pending, the first *regular* response (logon flag unset)
    /// completes the login; a logon response carrying errors fails it
    /// and drops any pending player. A logon response without errors is
    /// just the handshake echo.
    fn handle_login(&mut self, response: &Response) {
        if self.session().is_none()
            || self.login_status() != LoginStatus::Pending
        {
            return;
        }
        if !response.logon {
            tracing::info!("server login acknowledged");
            self.set_login(LoginStatus::Acknowledged);
        } else if !response.errors.is_empty() {
            tracing::error!(errors = ?response.errors, "server rejected login");
            self.set_login(LoginStatus::Failed);
            self.pending_player_mut().take();
        }
    }

    /// The server loaded a save: all local state is stale. Players and
    /// module are dropped and a fresh snapshot is requested; player
    /// wrappers come back through `new_chars` on later responses.
    async fn handle_load(&mut self, load: Load) {
        tracing::info!(save = load.save, "server loaded save, resetting state");
        self.reset_for_load(embershell_engine::Module::new(load.module));
        if let Some(session) = self.session_arc() {
            if let Err(e) = session.update().await {
                tracing::error!(error = %e, "unable to request snapshot after load");
            }
        }
    }

    /// Resolves a server-announced character against the module.
    ///
    /// Idempotent: a character already wrapped is skipped without
    /// touching the active player. A character missing from the module
    /// is logged and dropped — the next snapshot will carry it.
    fn resolve_new_character(
        &mut self,
        data: embershell_engine::CharacterData,
    ) {
        if self
            .players()
            .iter()
            .any(|p| p.id() == data.id && p.serial() == data.serial)
        {
            return;
        }
        let character = ObjectRef::new(&data.id, &data.serial);
        let present = self
            .module()
            .is_some_and(|m| m.character(&data.id, &data.serial).is_some());
        if !present {
            tracing::error!(%character, "new character not present in module");
            return;
        }
        tracing::info!(%character, "new player character resolved");
        self.add_player(Player::new(character));
    }

    /// Spawns the character held back for login completion, once the
    /// login is acknowledged and a module is present to spawn into.
    fn spawn_pending_player(&mut self) {
        if self.login_status() != LoginStatus::Acknowledged
            || self.module().is_none()
        {
            return;
        }
        let Some(data) = self.pending_player_mut().take() else {
            return;
        };
        if let Err(e) = self.spawn_player(data) {
            tracing::error!(error = %e, "unable to spawn player after login");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embershell_engine::{
        AreaData, ChapterData, CharacterData, Module, ModuleData, Position,
    };
    use embershell_protocol::Update;

    fn snapshot() -> ModuleData {
        ModuleData {
            id: "testmod".into(),
            chapter: ChapterData {
                id: "ch1".into(),
                start_area: "village".into(),
                start_pos: Some(Position::new(1.0, 2.0)),
                areas: vec![AreaData {
                    id: "village".into(),
                    characters: vec![CharacterData {
                        id: "pc".into(),
                        serial: "0".into(),
                        level: 1,
                        ..Default::default()
                    }],
                }],
            },
        }
    }

    #[tokio::test]
    async fn test_update_constructs_module_when_absent() {
        let mut game = Game::new(None);

        game.handle_response(Response {
            update: Some(Update { module: snapshot() }),
            ..Default::default()
        })
        .await;

        assert_eq!(game.module().unwrap().id(), "testmod");
    }

    #[tokio::test]
    async fn test_update_patches_existing_module() {
        let mut game = Game::new(Some(Module::new(snapshot())));

        game.handle_response(Response {
            update: Some(Update {
                module: ModuleData {
                    chapter: ChapterData {
                        areas: vec![AreaData {
                            id: "village".into(),
                            characters: vec![CharacterData {
                                id: "pc".into(),
                                serial: "0".into(),
                                level: 7,
                                ..Default::default()
                            }],
                        }],
                        ..Default::default()
                    },
                    ..Default::default()
                },
            }),
            ..Default::default()
        })
        .await;

        let module = game.module().unwrap();
        assert_eq!(module.id(), "testmod");
        assert_eq!(module.character("pc", "0").unwrap().level(), 7);
    }

    #[tokio::test]
    async fn test_new_char_resolution_is_idempotent() {
        let mut game = Game::new(Some(Module::new(snapshot())));
        let announce = Response {
            new_chars: vec![CharacterData {
                id: "pc".into(),
                serial: "0".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        game.handle_response(announce.clone()).await;
        game.handle_response(announce).await;

        assert_eq!(game.players().len(), 1);
        assert_eq!(
            game.active_player_ref().unwrap().character(),
            &ObjectRef::new("pc", "0")
        );
    }

    #[tokio::test]
    async fn test_new_char_missing_from_module_is_dropped() {
        let mut game = Game::new(Some(Module::new(snapshot())));

        game.handle_response(Response {
            new_chars: vec![CharacterData {
                id: "stranger".into(),
                serial: "0".into(),
                ..Default::default()
            }],
            ..Default::default()
        })
        .await;

        assert!(game.players().is_empty());
    }

    #[tokio::test]
    async fn test_load_resets_players_and_module() {
        let mut game = Game::new(Some(Module::new(snapshot())));
        game.spawn_player(CharacterData {
            id: "old".into(),
            serial: "0".into(),
            ..Default::default()
        })
        .unwrap();

        let mut fresh = snapshot();
        fresh.id = "loadedmod".into();
        game.handle_response(Response {
            load: Some(embershell_protocol::Load {
                save: "slot1".into(),
                module: fresh,
            }),
            ..Default::default()
        })
        .await;

        assert!(game.players().is_empty());
        assert!(game.active_player_ref().is_none());
        assert_eq!(game.module().unwrap().id(), "loadedmod");
    }

    #[tokio::test]
    async fn test_update_applies_despite_errors_in_same_response() {
        let mut game = Game::new(None);

        game.handle_response(Response {
            update: Some(Update { module: snapshot() }),
            errors: vec!["bad move".into(), "bad chat".into()],
            ..Default::default()
        })
        .await;

        // Errors are logged only; the snapshot still lands.
        assert_eq!(game.module().unwrap().id(), "testmod");
    }

    #[tokio::test]
    async fn test_errors_only_response_changes_nothing() {
        let mut game = Game::new(Some(Module::new(snapshot())));

        game.handle_response(Response {
            errors: vec!["nonsense request".into()],
            ..Default::default()
        })
        .await;

        assert_eq!(game.module().unwrap().id(), "testmod");
        assert!(game.players().is_empty());
    }
}
