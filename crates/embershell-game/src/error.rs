//! Error types for the synchronization layer.

use embershell_engine::{ObjectRef, SlotKind};

/// Errors raised by facade and wrapper operations.
///
/// Only *local* failures surface here — a rejected equip, a missing
/// item. Forwarding failures never do: the remote authority corrects
/// divergence through later snapshots, so a failed send is logged and
/// play continues.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No module has been loaded or received yet.
    #[error("no module loaded")]
    NoModule,

    /// The referenced character is not present in the module.
    #[error("character not found: {0}")]
    CharacterNotFound(ObjectRef),

    /// The referenced item is not in the source container.
    #[error("item not found: {0}")]
    ItemNotFound(ObjectRef),

    /// The referenced dialog is not carried by its owner.
    #[error("dialog not found: {0}")]
    DialogNotFound(String),

    /// The character does not meet the object's equip requirements.
    #[error("equip requirements not met")]
    RequirementsNotMet,

    /// Every slot of the required kind is already occupied.
    #[error("no free equipment slot of kind: {0:?}")]
    NoFreeSlot(SlotKind),

    /// The object occupies no slot kinds at all, so it cannot be worn.
    #[error("object fits no equipment slot")]
    NoValidSlot,

    /// The chapter's start area does not exist in the module.
    #[error("start area not found: {0}")]
    StartAreaNotFound(String),
}
