// Live roster of tracked players and the projection derived from the selection.

use crate::domain::position::Position;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// World name given to placeholders created from a roster snapshot.
pub const UNKNOWN_WORLD: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub name: String,
    pub position: Position,
    pub world: String,
    pub last_update: DateTime<Utc>,
    // First-sighting order; used for display order and reselection.
    pub joined: u64,
}

/// The single "currently displayed" position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub position: Position,
    pub player: Option<String>,
    pub world: Option<String>,
}

#[derive(Debug, Default)]
pub struct Roster {
    entities: HashMap<String, EntityState>,
    selected: Option<String>,
    projection: Projection,
    next_joined: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a position report, creating the entity on first sighting.
    pub fn apply_position(
        &mut self,
        name: &str,
        position: Position,
        world: &str,
        now: DateTime<Utc>,
    ) {
        let position = position.rounded();
        let joined = match self.entities.get(name) {
            Some(existing) => existing.joined,
            None => self.take_join_order(),
        };
        self.entities.insert(
            name.to_string(),
            EntityState {
                name: name.to_string(),
                position,
                world: world.to_string(),
                last_update: now,
                joined,
            },
        );

        let follows = match self.selected.as_deref() {
            None => true,
            Some(selected) => selected == name,
        };
        if follows {
            self.selected = Some(name.to_string());
            self.projection = Projection {
                position,
                player: Some(name.to_string()),
                world: Some(world.to_string()),
            };
        }
    }

    /// Join notices carry no position; the entity appears on its first report.
    pub fn apply_join(&mut self, _name: &str) {}

    /// Removes the entity and moves the selection if it pointed at it.
    pub fn apply_leave(&mut self, name: &str) -> Option<EntityState> {
        let removed = self.entities.remove(name)?;

        if self.selected.as_deref() == Some(name) {
            match self.earliest_joined() {
                Some(next) => {
                    self.select(&next);
                }
                None => {
                    self.selected = None;
                    self.projection.player = None;
                    self.projection.world = None;
                }
            }
        }

        Some(removed)
    }

    /// Adds origin placeholders for names not yet known. Returns how many were added.
    pub fn apply_snapshot<I, S>(&mut self, names: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for name in names {
            let name = name.as_ref();
            if self.entities.contains_key(name) {
                continue;
            }
            let joined = self.take_join_order();
            self.entities.insert(
                name.to_string(),
                EntityState {
                    name: name.to_string(),
                    position: Position::ORIGIN,
                    world: UNKNOWN_WORLD.to_string(),
                    last_update: now,
                    joined,
                },
            );
            added += 1;
        }
        added
    }

    /// Selects a known entity. Unknown names leave the roster untouched.
    pub fn select(&mut self, name: &str) -> bool {
        let Some(entity) = self.entities.get(name) else {
            return false;
        };

        self.projection = Projection {
            position: entity.position,
            player: Some(entity.name.clone()),
            world: Some(entity.world.clone()),
        };
        self.selected = Some(entity.name.clone());
        true
    }

    /// Replaces the displayed coordinates without touching any entity.
    pub fn override_projection(&mut self, position: Position) {
        self.projection.position = position;
    }

    pub fn get(&self, name: &str) -> Option<&EntityState> {
        self.entities.get(name)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Entities in first-sighting order.
    pub fn entities(&self) -> Vec<&EntityState> {
        let mut entities: Vec<&EntityState> = self.entities.values().collect();
        entities.sort_by_key(|entity| entity.joined);
        entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn take_join_order(&mut self) -> u64 {
        let joined = self.next_joined;
        self.next_joined += 1;
        joined
    }

    fn earliest_joined(&self) -> Option<String> {
        self.entities
            .values()
            .min_by_key(|entity| entity.joined)
            .map(|entity| entity.name.clone())
    }
}
