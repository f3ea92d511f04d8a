/// Game settings
///
/// Every tunable number of the simulation lives here.  Settings can be
/// loaded from a JSON file; any field left out keeps its default.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub w: f32,
    pub h: f32,
    /// Distance from the bottom of the surface to the player's top edge.
    pub bottom_offset: f32,
    /// Horizontal distance covered per frame.
    pub speed: f32,
    pub cooldown_between_shots: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            w: 40.0,
            h: 20.0,
            bottom_offset: 50.0,
            speed: 10.0,
            cooldown_between_shots: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub rows: usize,
    pub columns: usize,
    pub w: f32,
    pub h: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub cooldown_between_shots: u32,
    /// Enemies only roll for a shot on frames divisible by this.
    pub fire_period: u64,
    /// Chance of firing on an eligible frame (Easy difficulty).
    pub fire_chance: f64,
    /// Row speed in surface units per frame (Easy difficulty).
    pub row_speed: f32,
    /// How far a row descends each time it reaches an edge.
    pub step_down: f32,
    /// Rows turn around this far from the surface edge.
    pub edge_margin: f32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 11,
            w: 30.0,
            h: 30.0,
            gap_x: 30.0,
            gap_y: 20.0,
            offset_x: 90.0,
            offset_y: 50.0,
            cooldown_between_shots: 50,
            fire_period: 50,
            fire_chance: 0.015,
            row_speed: 1.0,
            step_down: 20.0,
            edge_margin: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldSettings {
    pub count: usize,
    /// Horizontal distance between shield anchors; the first sits one
    /// spacing in from the left edge.
    pub spacing: f32,
    pub bottom_offset: f32,
    /// Parts per side of the square shield grid.
    pub grid: usize,
    pub part_size: f32,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            count: 3,
            spacing: 175.0,
            bottom_offset: 150.0,
            grid: 6,
            part_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    pub radius: f32,
    /// Signed vertical speed of player shots (negative is upward).
    pub player_speed: f32,
    pub enemy_speed: f32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            radius: 5.0,
            player_speed: -10.0,
            enemy_speed: 10.0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logical drawing surface, independent of the terminal size.
    pub width: f32,
    pub height: f32,
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub shield: ShieldSettings,
    pub projectile: ProjectileSettings,
    pub score_per_enemy: u32,
    /// Let the player drift toward the pointer when no arrow key is held.
    pub pointer_steering: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            player: PlayerSettings::default(),
            enemy: EnemySettings::default(),
            shield: ShieldSettings::default(),
            projectile: ProjectileSettings::default(),
            score_per_enemy: 10,
            pointer_steering: false,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> io::Result<Self> {
        let settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from `path`, falling back to the defaults when the file
    /// does not exist.  Malformed files are an error.
    pub fn load(path: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }
}
