//! Typed session façade over [`Connection`].
//!
//! Each method builds exactly one [`Request`] containing exactly one
//! populated action list of length one and hands it to the connection.
//! On success there is nothing to return — effects are observed only
//! through later responses on the queue.

use std::collections::BTreeMap;

use embershell_engine::{CharacterData, ObjectRef, SlotKind};
use embershell_protocol::{
    Chat, DialogAction, DialogAnswerAction, Equip, EquipSlot, Login, Move,
    Request, Target, Trade, TransferItems, Unequip, Use,
};

use crate::{ConnectError, Connection};

/// The remote-authority session: one typed method per action kind.
pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Sends login credentials.
    pub async fn login(&self, id: &str, pass: &str) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                login: vec![Login {
                    id: id.into(),
                    pass: pass.into(),
                }],
                ..Default::default()
            })
            .await
    }

    /// Requests a fresh module snapshot. Issued right after a session
    /// is attached to seed initial state.
    pub async fn update(&self) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                update: true,
                ..Default::default()
            })
            .await
    }

    /// Forwards a character move.
    pub async fn move_to(
        &self,
        id: &str,
        serial: &str,
        x: f32,
        y: f32,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                moves: vec![Move {
                    id: id.into(),
                    serial: serial.into(),
                    x,
                    y,
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards a chat message.
    pub async fn chat(
        &self,
        id: &str,
        serial: &str,
        message: &str,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                chat: vec![Chat {
                    id: id.into(),
                    serial: serial.into(),
                    message: message.into(),
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards a target change; `None` clears the target.
    pub async fn target(
        &self,
        id: &str,
        serial: &str,
        target: Option<ObjectRef>,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                target: vec![Target {
                    id: id.into(),
                    serial: serial.into(),
                    target,
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards a use action on an object.
    pub async fn use_object(
        &self,
        user_id: &str,
        user_serial: &str,
        object_id: &str,
        object_serial: Option<&str>,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                uses: vec![Use {
                    user_id: user_id.into(),
                    user_serial: user_serial.into(),
                    object_id: object_id.into(),
                    object_serial: object_serial.map(Into::into),
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards an equip action naming every slot the item occupies.
    pub async fn equip(
        &self,
        id: &str,
        serial: &str,
        item: ObjectRef,
        slots: Vec<(SlotKind, usize)>,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                equip: vec![Equip {
                    id: id.into(),
                    serial: serial.into(),
                    item,
                    slots: slots
                        .into_iter()
                        .map(|(kind, index)| EquipSlot { kind, index })
                        .collect(),
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards an unequip action.
    pub async fn unequip(
        &self,
        id: &str,
        serial: &str,
        item: ObjectRef,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                unequip: vec![Unequip {
                    id: id.into(),
                    serial: serial.into(),
                    item,
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards one batched container transfer, items grouped by ID.
    pub async fn transfer_items(
        &self,
        from: ObjectRef,
        to: ObjectRef,
        items: BTreeMap<String, Vec<String>>,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                transfer_items: vec![TransferItems { from, to, items }],
                ..Default::default()
            })
            .await
    }

    /// Forwards one batched trade: a sell half and a buy half.
    pub async fn trade(
        &self,
        sell: TransferItems,
        buy: TransferItems,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                trade: vec![Trade { sell, buy }],
                ..Default::default()
            })
            .await
    }

    /// Forwards a dialog start.
    pub async fn start_dialog(
        &self,
        owner: ObjectRef,
        target: ObjectRef,
        dialog_id: &str,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                dialog: vec![DialogAction {
                    owner,
                    target,
                    dialog_id: dialog_id.into(),
                }],
                ..Default::default()
            })
            .await
    }

    /// Forwards a dialog answer.
    pub async fn answer_dialog(
        &self,
        owner: ObjectRef,
        target: ObjectRef,
        dialog_id: &str,
        answer_id: &str,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                dialog_answer: vec![DialogAnswerAction {
                    owner,
                    target,
                    dialog_id: dialog_id.into(),
                    answer_id: answer_id.into(),
                }],
                ..Default::default()
            })
            .await
    }

    /// Asks the server to save the session under the given name.
    pub async fn save(&self, name: &str) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                save: vec![name.into()],
                ..Default::default()
            })
            .await
    }

    /// Asks the server to load the named save.
    pub async fn load(&self, name: &str) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                load: vec![name.into()],
                ..Default::default()
            })
            .await
    }

    /// Submits a new character to the server.
    pub async fn new_character(
        &self,
        data: CharacterData,
    ) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                new_char: vec![data],
                ..Default::default()
            })
            .await
    }

    /// Forwards a raw command-interpreter line.
    pub async fn command(&self, text: &str) -> Result<(), ConnectError> {
        self.conn
            .send(&Request {
                command: vec![text.into()],
                ..Default::default()
            })
            .await
    }

    /// Announces the close to the server (best effort) and closes the
    /// connection.
    pub async fn close(&self) {
        let goodbye = Request {
            close: true,
            ..Default::default()
        };
        if let Err(e) = self.conn.send(&goodbye).await {
            tracing::debug!(error = %e, "unable to send close request");
        }
        self.conn.close().await;
    }
}
