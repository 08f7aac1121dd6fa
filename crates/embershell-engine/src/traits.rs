//! Capability traits: the narrow interfaces the sync layer depends on.
//!
//! Concrete entity types opt into these explicitly. Code above this crate
//! accepts `&dyn Usable` / `&dyn Equipable` / … instead of naming entity
//! types, so new kinds of usable or equipable objects slot in without
//! touching the sync layer.

use crate::data::{ObjectRef, Requirement, SlotKind, UseActionData};
use crate::item::Item;

/// Something that can be activated with a use action.
pub trait Usable {
    /// Object ID.
    fn id(&self) -> &str;

    /// Instance serial, if the object carries one.
    fn serial(&self) -> Option<&str>;

    /// The use action, or `None` if the object is not currently usable.
    fn use_action(&self) -> Option<&UseActionData>;
}

/// Something that can be placed into equipment slots.
pub trait Equipable {
    /// Reference to this object (ID + serial).
    fn object_ref(&self) -> ObjectRef;

    /// Slot kinds this object occupies. One entry per required slot.
    fn slots(&self) -> &[SlotKind];

    /// Requirements a character must meet to equip this object.
    fn equip_reqs(&self) -> &[Requirement];
}

/// Something that holds items.
pub trait Container {
    fn items(&self) -> &[Item];

    /// Looks up an item by ID + serial.
    fn item(&self, id: &str, serial: &str) -> Option<&Item>;

    fn add_item(&mut self, item: Item);

    /// Removes and returns an item. `None` if not present.
    fn remove_item(&mut self, id: &str, serial: &str) -> Option<Item>;
}

/// Something with health that can be targeted and killed.
pub trait Killable {
    fn health(&self) -> i32;

    fn max_health(&self) -> i32;

    fn alive(&self) -> bool {
        self.health() > 0
    }
}
