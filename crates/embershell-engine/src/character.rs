//! Runtime character state: position, destination, target, chat log,
//! inventory, equipment, dialogs, and use-action gating.

use crate::data::{
    AttributesData, CharacterData, ObjectRef, Position, Requirement,
};
use crate::dialog::Dialog;
use crate::equipment::Equipment;
use crate::inventory::Inventory;
use crate::traits::{Killable, Usable};

/// Movement speed in world units per second.
const MOVE_SPEED: f32 = 40.0;

/// Why a use action was rejected by the local simulation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UseError {
    /// The object has no use action at all.
    #[error("object is not usable: {0}")]
    NotUsable(String),

    /// The character's use cooldown has not elapsed yet.
    #[error("use action on cooldown ({remaining_ms} ms remaining)")]
    OnCooldown { remaining_ms: u64 },
}

/// One entry in a character's chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    /// Set for messages produced locally in the player's language;
    /// untranslated messages go through the lang table before display.
    pub translated: bool,
}

/// One character inside an area.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    id: String,
    serial: String,
    name: String,
    level: u32,
    attributes: AttributesData,
    health: i32,
    max_health: i32,
    position: Position,
    dest_point: Position,
    target: Option<ObjectRef>,
    ai: bool,
    inventory: Inventory,
    equipment: Equipment,
    dialogs: Vec<Dialog>,
    chat_log: Vec<ChatMessage>,
    use_cooldown_ms: u64,
}

impl Character {
    /// Builds a runtime character from resource data.
    pub fn new(data: CharacterData) -> Self {
        let owner = ObjectRef::new(&data.id, &data.serial);
        let dialogs = data
            .dialogs
            .iter()
            .map(|d| Dialog::new(d.clone(), Some(owner.clone())))
            .collect();
        Self {
            inventory: Inventory::new(data.items),
            equipment: Equipment::new(data.equipment),
            dialogs,
            id: data.id,
            serial: data.serial,
            name: data.name,
            level: data.level,
            attributes: data.attributes,
            health: data.health,
            max_health: data.max_health,
            position: data.position,
            dest_point: data.position,
            target: None,
            ai: data.ai,
            chat_log: Vec::new(),
            use_cooldown_ms: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.id, &self.serial)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn attributes(&self) -> &AttributesData {
        &self.attributes
    }

    pub fn ai(&self) -> bool {
        self.ai
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, pos: Position) {
        self.position = pos;
        self.dest_point = pos;
    }

    pub fn dest_point(&self) -> Position {
        self.dest_point
    }

    /// Sets the point the character walks toward on subsequent updates.
    pub fn set_dest_point(&mut self, x: f32, y: f32) {
        self.dest_point = Position::new(x, y);
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: Option<ObjectRef>) {
        self.target = target;
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn equipment_mut(&mut self) -> &mut Equipment {
        &mut self.equipment
    }

    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut [Dialog] {
        &mut self.dialogs
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    /// Appends a message to the chat log.
    pub fn add_chat_message(&mut self, text: impl Into<String>, translated: bool) {
        self.chat_log.push(ChatMessage {
            text: text.into(),
            translated,
        });
    }

    /// Checks the character against a set of requirements.
    pub fn meets_reqs(&self, reqs: &[Requirement]) -> bool {
        use crate::data::Attribute;
        reqs.iter().all(|req| match req {
            Requirement::Level { min } => self.level >= *min,
            Requirement::Attribute { attribute, min } => {
                let value = match attribute {
                    Attribute::Strength => self.attributes.strength,
                    Attribute::Constitution => self.attributes.constitution,
                    Attribute::Dexterity => self.attributes.dexterity,
                    Attribute::Intelligence => self.attributes.intelligence,
                    Attribute::Wisdom => self.attributes.wisdom,
                };
                value >= *min
            }
        })
    }

    /// Activates a usable object.
    ///
    /// The local simulation only gates the action (usability, cooldown) and
    /// arms the cooldown on success; effects belong to the authority.
    ///
    /// # Errors
    /// [`UseError::NotUsable`] if the object carries no use action,
    /// [`UseError::OnCooldown`] if the previous action has not cooled down.
    pub fn use_object(&mut self, object: &dyn Usable) -> Result<(), UseError> {
        let action = object
            .use_action()
            .ok_or_else(|| UseError::NotUsable(object.id().to_string()))?;
        if self.use_cooldown_ms > 0 {
            return Err(UseError::OnCooldown {
                remaining_ms: self.use_cooldown_ms,
            });
        }
        self.use_cooldown_ms = action.cooldown_ms;
        Ok(())
    }

    pub fn use_cooldown_ms(&self) -> u64 {
        self.use_cooldown_ms
    }

    /// Advances the character by `delta_ms`: cooldown decay and movement
    /// toward the destination point.
    pub fn update(&mut self, delta_ms: u64) {
        self.use_cooldown_ms = self.use_cooldown_ms.saturating_sub(delta_ms);

        let dx = self.dest_point.x - self.position.x;
        let dy = self.dest_point.y - self.position.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= f32::EPSILON {
            return;
        }
        let step = MOVE_SPEED * delta_ms as f32 / 1000.0;
        if step >= dist {
            self.position = self.dest_point;
        } else {
            self.position.x += dx / dist * step;
            self.position.y += dy / dist * step;
        }
    }

    /// Serializes the character back into resource data.
    pub fn data(&self) -> CharacterData {
        CharacterData {
            id: self.id.clone(),
            serial: self.serial.clone(),
            name: self.name.clone(),
            level: self.level,
            attributes: self.attributes,
            health: self.health,
            max_health: self.max_health,
            position: self.position,
            ai: self.ai,
            items: self.inventory.data(),
            equipment: self.equipment.data(),
            dialogs: self.dialogs.iter().map(|d| d.data().clone()).collect(),
        }
    }
}

impl Killable for Character {
    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Attribute, ItemData, UseActionData};
    use crate::item::Item;

    fn char_with(level: u32, strength: i32) -> Character {
        Character::new(CharacterData {
            id: "pc".into(),
            serial: "0".into(),
            level,
            attributes: AttributesData {
                strength,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_meets_reqs_level_and_attribute() {
        let c = char_with(5, 12);
        let reqs = vec![
            Requirement::Level { min: 5 },
            Requirement::Attribute {
                attribute: Attribute::Strength,
                min: 10,
            },
        ];
        assert!(c.meets_reqs(&reqs));
    }

    #[test]
    fn test_meets_reqs_unmet_attribute_fails() {
        let c = char_with(5, 8);
        let reqs = vec![Requirement::Attribute {
            attribute: Attribute::Strength,
            min: 10,
        }];
        assert!(!c.meets_reqs(&reqs));
    }

    #[test]
    fn test_use_object_arms_cooldown() {
        let mut c = char_with(1, 0);
        let potion = Item::new(ItemData {
            id: "potion".into(),
            serial: "0".into(),
            use_action: Some(UseActionData { cooldown_ms: 1000 }),
            ..Default::default()
        });

        c.use_object(&potion).expect("first use should succeed");

        assert_eq!(c.use_cooldown_ms(), 1000);
        assert_eq!(
            c.use_object(&potion),
            Err(UseError::OnCooldown { remaining_ms: 1000 })
        );
    }

    #[test]
    fn test_use_object_without_use_action_rejected() {
        let mut c = char_with(1, 0);
        let rock = Item::new(ItemData {
            id: "rock".into(),
            ..Default::default()
        });

        assert!(matches!(
            c.use_object(&rock),
            Err(UseError::NotUsable(_))
        ));
    }

    #[test]
    fn test_update_moves_toward_dest_point() {
        let mut c = char_with(1, 0);
        c.set_dest_point(40.0, 0.0);

        // One second of movement covers MOVE_SPEED units.
        c.update(1000);

        assert_eq!(c.position(), Position::new(40.0, 0.0));
    }

    #[test]
    fn test_update_does_not_overshoot() {
        let mut c = char_with(1, 0);
        c.set_dest_point(10.0, 0.0);

        c.update(10_000);

        assert_eq!(c.position(), Position::new(10.0, 0.0));
    }

    #[test]
    fn test_update_decays_use_cooldown() {
        let mut c = char_with(1, 0);
        let potion = Item::new(ItemData {
            id: "potion".into(),
            use_action: Some(UseActionData { cooldown_ms: 500 }),
            ..Default::default()
        });
        c.use_object(&potion).unwrap();

        c.update(200);
        assert_eq!(c.use_cooldown_ms(), 300);
        c.update(1000);
        assert_eq!(c.use_cooldown_ms(), 0);
    }
}
