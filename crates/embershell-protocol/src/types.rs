//! Envelope types for the wire format.
//!
//! A [`Request`] or [`Response`] is a **batch envelope**, not a tagged
//! union: it carries one optional repeated field per action kind, and a
//! single envelope may legally populate any subset of them at once —
//! including none at all, which is a valid no-op. Every field defaults
//! and empty lists are skipped on encode, so a typical envelope is one
//! short JSON object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use embershell_engine::{CharacterData, ModuleData, ObjectRef, SlotKind};

// ---------------------------------------------------------------------------
// Per-action records (client → server)
// ---------------------------------------------------------------------------

/// Login credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pass: String,
}

/// Move a character toward a destination point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Move {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Chat message spoken by a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub message: String,
}

/// Change (or clear) a character's target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    /// `None` clears the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ObjectRef>,
}

/// Use an object (item, skill, door, …).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Use {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_serial: String,
    #[serde(default)]
    pub object_id: String,
    /// Absent for objects without an instance serial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_serial: Option<String>,
}

/// One equipment slot used by an equip action: kind plus slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipSlot {
    pub kind: SlotKind,
    pub index: usize,
}

/// Equip an item, naming every slot it ended up in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equip {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub item: ObjectRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<EquipSlot>,
}

/// Remove an item from all equipment slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unequip {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub item: ObjectRef,
}

/// Move items between two containers.
///
/// Items are grouped by item ID, each entry listing the serials moved —
/// the historical wire shape, kept because it batches well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferItems {
    #[serde(default)]
    pub from: ObjectRef,
    #[serde(default)]
    pub to: ObjectRef,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<String, Vec<String>>,
}

/// A trade: a sell half and a buy half, each a container transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(default)]
    pub sell: TransferItems,
    #[serde(default)]
    pub buy: TransferItems,
}

/// Start a dialog between its owner and a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogAction {
    #[serde(default)]
    pub owner: ObjectRef,
    #[serde(default)]
    pub target: ObjectRef,
    #[serde(default)]
    pub dialog_id: String,
}

/// Answer the active stage of a running dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogAnswerAction {
    #[serde(default)]
    pub owner: ObjectRef,
    #[serde(default)]
    pub target: ObjectRef,
    #[serde(default)]
    pub dialog_id: String,
    #[serde(default)]
    pub answer_id: String,
}

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// Client → server batch envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub login: Vec<Login>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "move")]
    pub moves: Vec<Move>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chat: Vec<Chat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "use")]
    pub uses: Vec<Use>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equip: Vec<Equip>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unequip: Vec<Unequip>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfer_items: Vec<TransferItems>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trade: Vec<Trade>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialog: Vec<DialogAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialog_answer: Vec<DialogAnswerAction>,
    /// Save names to persist under on the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub save: Vec<String>,
    /// Save names to load on the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_char: Vec<CharacterData>,
    /// Raw command-interpreter lines for the server to execute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Asks the server for a fresh module snapshot.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub update: bool,
    /// Announces the client is closing the session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub close: bool,
}

impl Request {
    /// `true` when no action field is populated (a valid no-op envelope).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Module snapshot payload of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub module: ModuleData,
}

/// Load-game signal: the server switched to a saved session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Load {
    #[serde(default)]
    pub save: String,
    #[serde(default)]
    pub module: ModuleData,
}

/// Server → client batch envelope.
///
/// Like [`Request`], any subset of fields may be populated. An envelope
/// carrying only `errors` is valid; so is a completely empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Set on the login-handshake acknowledgment only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub logon: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Update>,
    /// Characters newly announced to this client.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_chars: Vec<CharacterData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<Load>,
    /// Opaque server-side error strings. Logged by the client, never fatal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
