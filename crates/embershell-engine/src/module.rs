//! The runtime module: chapter, areas, and character lookup.
//!
//! Exactly one module is authoritative at a time. Remote snapshots come in
//! as [`ModuleData`] and are either used to build a fresh module or merged
//! into the current one via [`Module::apply`] with patch semantics:
//! populated fields overwrite, absent fields stay untouched.

use crate::character::Character;
use crate::data::{AreaData, ChapterData, ModuleData, Position};

/// One area of the chapter and the characters inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    id: String,
    characters: Vec<Character>,
}

impl Area {
    pub fn new(data: AreaData) -> Self {
        Self {
            id: data.id,
            characters: data.characters.into_iter().map(Character::new).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn characters_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    pub fn add_character(&mut self, character: Character) {
        self.characters.push(character);
    }

    /// Merges area data in: characters are upserted by ID + serial.
    fn apply(&mut self, data: AreaData) {
        for cd in data.characters {
            let replacement = Character::new(cd);
            match self.characters.iter_mut().find(|c| {
                c.id() == replacement.id() && c.serial() == replacement.serial()
            }) {
                Some(existing) => *existing = replacement,
                None => self.characters.push(replacement),
            }
        }
    }

    fn data(&self) -> AreaData {
        AreaData {
            id: self.id.clone(),
            characters: self.characters.iter().map(Character::data).collect(),
        }
    }
}

/// The active chapter: start configuration plus areas.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    id: String,
    start_area: String,
    start_pos: Position,
    areas: Vec<Area>,
}

impl Chapter {
    pub fn new(data: ChapterData) -> Self {
        Self {
            id: data.id,
            start_area: data.start_area,
            start_pos: data.start_pos.unwrap_or_default(),
            areas: data.areas.into_iter().map(Area::new).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// ID of the area new players spawn into.
    pub fn start_area(&self) -> &str {
        &self.start_area
    }

    /// Spawn position inside the start area.
    pub fn start_pos(&self) -> Position {
        self.start_pos
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn areas_mut(&mut self) -> &mut [Area] {
        &mut self.areas
    }

    pub fn area_mut(&mut self, id: &str) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id() == id)
    }

    fn apply(&mut self, data: ChapterData) {
        if !data.id.is_empty() {
            self.id = data.id;
        }
        if !data.start_area.is_empty() {
            self.start_area = data.start_area;
        }
        if let Some(pos) = data.start_pos {
            self.start_pos = pos;
        }
        for ad in data.areas {
            match self.areas.iter_mut().find(|a| a.id() == ad.id) {
                Some(area) => area.apply(ad),
                None => self.areas.push(Area::new(ad)),
            }
        }
    }

    fn data(&self) -> ChapterData {
        ChapterData {
            id: self.id.clone(),
            start_area: self.start_area.clone(),
            start_pos: Some(self.start_pos),
            areas: self.areas.iter().map(Area::data).collect(),
        }
    }
}

/// The full runtime world state.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    id: String,
    chapter: Chapter,
}

impl Module {
    /// Builds a fresh module from a full snapshot.
    pub fn new(data: ModuleData) -> Self {
        Self {
            id: data.id,
            chapter: Chapter::new(data.chapter),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    pub fn chapter_mut(&mut self) -> &mut Chapter {
        &mut self.chapter
    }

    /// Finds a character anywhere in the chapter by ID + serial.
    pub fn character(&self, id: &str, serial: &str) -> Option<&Character> {
        self.chapter
            .areas
            .iter()
            .flat_map(|a| a.characters.iter())
            .find(|c| c.id() == id && c.serial() == serial)
    }

    pub fn character_mut(
        &mut self,
        id: &str,
        serial: &str,
    ) -> Option<&mut Character> {
        self.chapter
            .areas
            .iter_mut()
            .flat_map(|a| a.characters.iter_mut())
            .find(|c| c.id() == id && c.serial() == serial)
    }

    /// Merges a (possibly partial) snapshot into the current state.
    ///
    /// Patch semantics: non-empty fields overwrite, absent fields are
    /// untouched; areas and characters are upserted by ID (+ serial).
    /// A character replaced this way loses provisional local state — that
    /// overwrite is the client's consistency-recovery mechanism.
    pub fn apply(&mut self, data: ModuleData) {
        if !data.id.is_empty() {
            self.id = data.id;
        }
        self.chapter.apply(data.chapter);
    }

    /// Advances every character in every area by `delta_ms`.
    pub fn update(&mut self, delta_ms: u64) {
        for area in &mut self.chapter.areas {
            for character in &mut area.characters {
                character.update(delta_ms);
            }
        }
    }

    /// Serializes the module into a full snapshot.
    pub fn data(&self) -> ModuleData {
        ModuleData {
            id: self.id.clone(),
            chapter: self.chapter.data(),
        }
    }
}
