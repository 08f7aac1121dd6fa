//! Runtime item type.

use crate::data::{ItemData, ObjectRef, Requirement, SlotKind, UseActionData};
use crate::traits::{Equipable, Usable};

/// One item instance inside an inventory.
///
/// Thin wrapper over [`ItemData`] — items carry no runtime state of their
/// own on the client; cooldowns live on the character using them.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    data: ItemData,
}

impl Item {
    pub fn new(data: ItemData) -> Self {
        Self { data }
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn serial(&self) -> &str {
        &self.data.serial
    }

    pub fn value(&self) -> i64 {
        self.data.value
    }

    pub fn data(&self) -> &ItemData {
        &self.data
    }
}

impl Equipable for Item {
    fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.data.id, &self.data.serial)
    }

    fn slots(&self) -> &[SlotKind] {
        &self.data.slots
    }

    fn equip_reqs(&self) -> &[Requirement] {
        &self.data.equip_reqs
    }
}

impl Usable for Item {
    fn id(&self) -> &str {
        &self.data.id
    }

    fn serial(&self) -> Option<&str> {
        Some(&self.data.serial)
    }

    fn use_action(&self) -> Option<&UseActionData> {
        self.data.use_action.as_ref()
    }
}
