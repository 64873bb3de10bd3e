//! Terrain classification and the per-unit movement cost model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index of a terrain rule inside a [`TerrainTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(u16);

impl TerrainId {
    /// Open ground in the default table.
    pub const PLAINS: Self = Self(0);
    /// Woodland in the default table.
    pub const FOREST: Self = Self(1);
    /// Rough elevated ground in the default table.
    pub const HILLS: Self = Self(2);
    /// Water obstacle in the default table.
    pub const LAKE: Self = Self(3);
    /// Rock obstacle in the default table.
    pub const MOUNTAIN: Self = Self(4);

    /// Creates a terrain identifier from its table index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the table index of the terrain.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Movement rule attached to a named terrain classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainRule {
    /// Human readable name used by configuration files.
    pub name: String,
    /// Budget consumed when a unit enters a tile of this terrain.
    pub cost: u32,
    /// Whether the terrain blocks units that do not ignore obstacles.
    #[serde(default)]
    pub obstacle: bool,
}

impl TerrainRule {
    /// Creates a new terrain rule.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: u32, obstacle: bool) -> Self {
        Self {
            name: name.into(),
            cost,
            obstacle,
        }
    }
}

/// Ordered set of terrain rules addressed by [`TerrainId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTable {
    rules: Vec<TerrainRule>,
}

impl TerrainTable {
    /// Creates a table from rules; the rule at index `n` answers to `TerrainId::new(n)`.
    #[must_use]
    pub fn new(rules: Vec<TerrainRule>) -> Self {
        Self { rules }
    }

    /// Rule registered for the provided terrain.
    #[must_use]
    pub fn rule(&self, terrain: TerrainId) -> Option<&TerrainRule> {
        self.rules.get(usize::from(terrain.get()))
    }

    /// Resolves a terrain identifier from its configured name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<TerrainId> {
        self.iter()
            .find(|(_, rule)| rule.name == name)
            .map(|(id, _)| id)
    }

    /// Reports whether the terrain is registered in the table.
    #[must_use]
    pub fn contains(&self, terrain: TerrainId) -> bool {
        self.rule(terrain).is_some()
    }

    /// Reports whether the terrain is a registered obstacle.
    #[must_use]
    pub fn is_obstacle(&self, terrain: TerrainId) -> bool {
        self.rule(terrain).is_some_and(|rule| rule.obstacle)
    }

    /// Iterates over every registered terrain in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &TerrainRule)> {
        self.rules
            .iter()
            .take(usize::from(u16::MAX))
            .enumerate()
            .filter_map(|(index, rule)| {
                u16::try_from(index)
                    .ok()
                    .map(|value| (TerrainId::new(value), rule))
            })
    }

    /// Number of registered terrains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Reports whether the table holds no terrain at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TerrainTable {
    fn default() -> Self {
        Self::new(vec![
            TerrainRule::new("plains", 1, false),
            TerrainRule::new("forest", 2, false),
            TerrainRule::new("hills", 2, false),
            TerrainRule::new("lake", 1, true),
            TerrainRule::new("mountain", 3, true),
        ])
    }
}

/// Movement capabilities resolved once per unit type.
///
/// The profile answers both questions the search needs: whether a terrain may
/// ever be entered, and what entering it costs. Occupancy is checked
/// separately by the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementProfile {
    move_speed: u32,
    ignores_obstacles: bool,
    cost_overrides: BTreeMap<TerrainId, u32>,
}

impl MovementProfile {
    /// Creates a ground profile with the provided per-turn budget.
    #[must_use]
    pub fn new(move_speed: u32) -> Self {
        Self {
            move_speed,
            ignores_obstacles: false,
            cost_overrides: BTreeMap::new(),
        }
    }

    /// Lets the unit enter obstacle terrain.
    #[must_use]
    pub fn ignoring_obstacles(mut self) -> Self {
        self.ignores_obstacles = true;
        self
    }

    /// Replaces the table cost of a terrain for this unit type.
    #[must_use]
    pub fn with_cost_override(mut self, terrain: TerrainId, cost: u32) -> Self {
        let _ = self.cost_overrides.insert(terrain, cost);
        self
    }

    /// Budget renewed at the start of each of the owner's turns.
    #[must_use]
    pub const fn move_speed(&self) -> u32 {
        self.move_speed
    }

    /// Whether obstacle terrain is passable for the unit.
    #[must_use]
    pub const fn ignores_obstacles(&self) -> bool {
        self.ignores_obstacles
    }

    /// Whether the unit may ever enter the terrain, regardless of occupancy.
    ///
    /// Terrain missing from the table is never passable.
    #[must_use]
    pub fn passable(&self, terrain: TerrainId, table: &TerrainTable) -> bool {
        match table.rule(terrain) {
            Some(rule) => self.ignores_obstacles || !rule.obstacle,
            None => false,
        }
    }

    /// Budget consumed when the unit enters a tile of the provided terrain.
    #[must_use]
    pub fn cost(&self, terrain: TerrainId, table: &TerrainTable) -> Option<u32> {
        self.cost_overrides
            .get(&terrain)
            .copied()
            .or_else(|| table.rule(terrain).map(|rule| rule.cost))
    }

    /// Entry cost for passable terrain, `None` when the unit may never enter.
    #[must_use]
    pub fn step_cost(&self, terrain: TerrainId, table: &TerrainTable) -> Option<u32> {
        if !self.passable(terrain, table) {
            return None;
        }
        self.cost(terrain, table)
    }
}
