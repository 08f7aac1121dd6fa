//! Serializable resource data: the shapes that travel on the wire and in
//! save files.
//!
//! Every field carries `#[serde(default)]` so that partial payloads — the
//! incremental snapshots a remote authority pushes — deserialize cleanly.
//! [`Module::apply`](crate::Module::apply) relies on that: a missing field
//! means "leave the current value alone", a populated one means "overwrite".

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A reference to a game object by ID and serial number.
///
/// IDs name a kind of object ("iron-sword"), serials distinguish instances
/// of the same kind ("iron-sword" #0 vs #1). The pair is unique across a
/// module.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct ObjectRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
}

impl ObjectRef {
    pub fn new(id: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            serial: serial.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.serial)
    }
}

/// An XY position inside an area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Items and equipment
// ---------------------------------------------------------------------------

/// The body slot kinds an equipable item can occupy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SlotKind {
    Head,
    Neck,
    Chest,
    Hand,
    Finger,
    Legs,
    Feet,
}

/// A character attribute named by equip requirements and item data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    Strength,
    Constitution,
    Dexterity,
    Intelligence,
    Wisdom,
}

/// A requirement a character must satisfy, e.g. to equip an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Requirement {
    /// Minimum character level.
    Level { min: u32 },
    /// Minimum value of one attribute.
    Attribute { attribute: Attribute, min: i32 },
}

/// Use-action data: what happens when an object is used.
///
/// The client only models the part it needs for action gating — the
/// cooldown. Effects are the authority's business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UseActionData {
    #[serde(default)]
    pub cooldown_ms: u64,
}

/// Resource data for one item instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub value: i64,
    /// Slot kinds this item occupies when equipped. Empty for items that
    /// cannot be equipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equip_reqs: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_action: Option<UseActionData>,
}

/// One equipment slot and the item it holds, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlotData {
    pub kind: SlotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ObjectRef>,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Base attribute block for a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributesData {
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub constitution: i32,
    #[serde(default)]
    pub dexterity: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub wisdom: i32,
}

/// Resource data for one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub attributes: AttributesData,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub max_health: i32,
    #[serde(default)]
    pub position: Position,
    /// Flagged characters are promoted to AI control when the simulation
    /// runs locally.
    #[serde(default)]
    pub ai: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemData>,
    /// Equipment layout. Empty means "use the default loadout".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<EquipmentSlotData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialogs: Vec<DialogData>,
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

/// One answer a player can pick at a dialog stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogAnswerData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Stage to jump to. `None` ends the dialog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// One stage of a dialog tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogStageData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Marks the stage the dialog (re)starts at.
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<DialogAnswerData>,
}

/// Resource data for one dialog tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogData {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<DialogStageData>,
}

// ---------------------------------------------------------------------------
// Module structure
// ---------------------------------------------------------------------------

/// Resource data for one area of a chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaData {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub characters: Vec<CharacterData>,
}

/// Resource data for the active chapter of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterData {
    #[serde(default)]
    pub id: String,
    /// Area new players spawn into.
    #[serde(default)]
    pub start_area: String,
    /// Spawn position inside the start area. `None` leaves the current
    /// configuration untouched on apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_pos: Option<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<AreaData>,
}

/// Full (or partial) serializable state of the game world.
///
/// Produced by the engine as a snapshot and consumed by
/// [`Module::new`](crate::Module::new) / [`Module::apply`](crate::Module::apply).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub chapter: ChapterData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_display() {
        let r = ObjectRef::new("iron-sword", "3");
        assert_eq!(r.to_string(), "iron-sword#3");
    }

    #[test]
    fn test_slot_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SlotKind::Hand).unwrap();
        assert_eq!(json, "\"hand\"");
    }

    #[test]
    fn test_requirement_json_shape() {
        let req = Requirement::Attribute {
            attribute: Attribute::Strength,
            min: 10,
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "attribute");
        assert_eq!(json["attribute"], "strength");
        assert_eq!(json["min"], 10);
    }

    #[test]
    fn test_module_data_empty_object_deserializes_to_default() {
        // Partial payloads must deserialize — apply() depends on it.
        let data: ModuleData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, ModuleData::default());
    }

    #[test]
    fn test_character_data_round_trip() {
        let data = CharacterData {
            id: "guard".into(),
            serial: "0".into(),
            level: 3,
            position: Position::new(10.0, 20.0),
            ai: true,
            items: vec![ItemData {
                id: "spear".into(),
                serial: "0".into(),
                slots: vec![SlotKind::Hand],
                ..Default::default()
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: CharacterData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }
}
