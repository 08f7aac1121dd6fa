//! Character equipment: typed slots with occupancy.

use crate::data::{EquipmentSlotData, ObjectRef, SlotKind};
use crate::traits::Equipable;

/// The default slot loadout every character starts with.
const DEFAULT_LOADOUT: [SlotKind; 9] = [
    SlotKind::Head,
    SlotKind::Neck,
    SlotKind::Chest,
    SlotKind::Hand,
    SlotKind::Hand,
    SlotKind::Finger,
    SlotKind::Finger,
    SlotKind::Legs,
    SlotKind::Feet,
];

/// One equipment slot: a kind and the item occupying it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentSlot {
    kind: SlotKind,
    item: Option<ObjectRef>,
}

impl EquipmentSlot {
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn item(&self) -> Option<&ObjectRef> {
        self.item.as_ref()
    }

    pub fn set_item(&mut self, item: Option<ObjectRef>) {
        self.item = item;
    }
}

/// A character's equipment: a fixed set of slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    slots: Vec<EquipmentSlot>,
}

impl Equipment {
    /// Builds equipment from resource data; an empty layout falls back to
    /// the default loadout.
    pub fn new(data: Vec<EquipmentSlotData>) -> Self {
        let slots = if data.is_empty() {
            DEFAULT_LOADOUT
                .iter()
                .map(|&kind| EquipmentSlot { kind, item: None })
                .collect()
        } else {
            data.into_iter()
                .map(|s| EquipmentSlot {
                    kind: s.kind,
                    item: s.item,
                })
                .collect()
        };
        Self { slots }
    }

    pub fn slots(&self) -> &[EquipmentSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [EquipmentSlot] {
        &mut self.slots
    }

    /// Reports whether the given object occupies at least one slot.
    pub fn equiped(&self, object: &dyn Equipable) -> bool {
        let wanted = object.object_ref();
        self.slots
            .iter()
            .any(|s| s.item.as_ref() == Some(&wanted))
    }

    /// Clears every slot holding the given object. Always succeeds.
    pub fn unequip(&mut self, object: &dyn Equipable) {
        let wanted = object.object_ref();
        for slot in &mut self.slots {
            if slot.item.as_ref() == Some(&wanted) {
                slot.item = None;
            }
        }
    }

    /// Serializes the equipment back into resource data.
    pub fn data(&self) -> Vec<EquipmentSlotData> {
        self.slots
            .iter()
            .map(|s| EquipmentSlotData {
                kind: s.kind,
                item: s.item.clone(),
            })
            .collect()
    }
}

impl Default for Equipment {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
