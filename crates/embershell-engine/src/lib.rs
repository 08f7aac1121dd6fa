//! Game module data model and local simulation for Embershell.
//!
//! This crate is the client's view of the game world: the serializable
//! resource data ([`ModuleData`] and friends) that travels inside wire
//! envelopes and save files, and the runtime state ([`Module`],
//! [`Character`], [`Dialog`], …) built from that data.
//!
//! The sync layer above this crate never depends on concrete entity types
//! beyond [`Character`] — everything else goes through the capability
//! traits ([`Usable`], [`Equipable`], [`Container`], [`Killable`]).
//!
//! # Architecture
//!
//! ```text
//! embershell-game (sync layer)  ← mutates the module, wraps characters
//!     ↕
//! embershell-engine (this crate)  ← world state and simulation rules
//!     ↕
//! embershell-protocol  ← carries ModuleData/CharacterData on the wire
//! ```

mod ai;
mod character;
mod data;
mod dialog;
mod equipment;
mod inventory;
mod item;
mod module;
mod traits;

pub use ai::Ai;
pub use character::{Character, ChatMessage, UseError};
pub use data::{
    AreaData, Attribute, AttributesData, CharacterData, ChapterData,
    DialogAnswerData, DialogData, DialogStageData, EquipmentSlotData,
    ItemData, ModuleData, ObjectRef, Position, Requirement, SlotKind,
    UseActionData,
};
pub use dialog::{Dialog, DialogStage};
pub use equipment::{Equipment, EquipmentSlot};
pub use inventory::Inventory;
pub use item::Item;
pub use module::{Area, Chapter, Module};
pub use traits::{Container, Equipable, Killable, Usable};
