//! Character inventory: the standard [`Container`] implementation.

use crate::data::ItemData;
use crate::item::Item;
use crate::traits::Container;

/// An ordered bag of item instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new(items: Vec<ItemData>) -> Self {
        Self {
            items: items.into_iter().map(Item::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serializes the inventory back into resource data.
    pub fn data(&self) -> Vec<ItemData> {
        self.items.iter().map(|i| i.data().clone()).collect()
    }
}

impl Container for Inventory {
    fn items(&self) -> &[Item] {
        &self.items
    }

    fn item(&self, id: &str, serial: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.id() == id && i.serial() == serial)
    }

    fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    fn remove_item(&mut self, id: &str, serial: &str) -> Option<Item> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id() == id && i.serial() == serial)?;
        Some(self.items.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, serial: &str) -> ItemData {
        ItemData {
            id: id.into(),
            serial: serial.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_remove_item_present_returns_item() {
        let mut inv = Inventory::new(vec![item("potion", "0"), item("potion", "1")]);

        let removed = inv.remove_item("potion", "1").expect("should remove");

        assert_eq!(removed.serial(), "1");
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.items()[0].serial(), "0");
    }

    #[test]
    fn test_remove_item_missing_returns_none() {
        let mut inv = Inventory::new(vec![item("potion", "0")]);

        assert!(inv.remove_item("sword", "0").is_none());
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_item_lookup_by_id_and_serial() {
        let inv = Inventory::new(vec![item("potion", "0"), item("potion", "1")]);

        assert!(inv.item("potion", "1").is_some());
        assert!(inv.item("potion", "2").is_none());
    }
}
