/// All game entity types — plain data plus their bounding shapes.
///
/// Entities never reference each other; the [`GameState`] owns every
/// collection and the update functions in `compute` borrow what they need.

use crate::config::Settings;
use crate::geometry::{Circle, Hitbox, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Anything that can be flagged for removal by the post-update filter pass.
pub trait Entity {
    fn is_destroyed(&self) -> bool;
}

/// Drop every entity flagged `destroy`.
pub fn where_not_destroyed<T: Entity>(entities: &mut Vec<T>) {
    entities.retain(|e| !e.is_destroyed());
}

macro_rules! entity_impls {
    ($($ty:ty),*) => {$(
        impl Entity for $ty {
            fn is_destroyed(&self) -> bool {
                self.destroy
            }
        }
    )*};
}

macro_rules! rect_hitbox {
    ($($ty:ty),*) => {$(
        impl Hitbox for $ty {
            fn hitbox(&self) -> Rect {
                Rect::new(self.x, self.y, self.w, self.h)
            }
        }
    )*};
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Who fired a projectile; decides what it can hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    /// Hits enemies.
    Player,
    /// Hits the player.
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Centre of the projectile.
    pub x: f32,
    pub y: f32,
    pub r: f32,
    /// Signed vertical speed; negative travels up.
    pub speed: f32,
    pub owner: BulletOwner,
    pub destroy: bool,
}

impl Projectile {
    pub fn circle(&self) -> Circle {
        Circle {
            x: self.x,
            y: self.y,
            r: self.r,
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    pub cooldown_between_shots: u32,
    /// Frames left before the next shot is allowed.
    pub current_cooldown: u32,
    pub destroy: bool,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub cooldown_between_shots: u32,
    pub current_cooldown: u32,
    pub destroy: bool,
}

/// Movement phase of an [`EnemyRow`].
///
/// Cycles `Right → DownLeft → Left → DownRight → Right`.  The `Down*`
/// phases descend and remember which way to go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowDirection {
    Right,
    DownLeft,
    Left,
    DownRight,
}

impl RowDirection {
    pub fn next(self) -> Self {
        match self {
            RowDirection::Right => RowDirection::DownLeft,
            RowDirection::DownLeft => RowDirection::Left,
            RowDirection::Left => RowDirection::DownRight,
            RowDirection::DownRight => RowDirection::Right,
        }
    }
}

/// One horizontal line of the invading formation; rows march independently.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyRow {
    pub enemies: Vec<Enemy>,
    pub direction: RowDirection,
    /// Distance covered per frame, horizontally and while descending.
    pub speed: f32,
    pub step_down: f32,
    /// Progress through the current descent.
    pub descended: f32,
    pub destroy: bool,
}

impl EnemyRow {
    /// Left edge of the left-most enemy.
    pub fn left(&self) -> Option<f32> {
        self.enemies.iter().map(|e| e.x).reduce(f32::min)
    }

    /// Right edge of the right-most enemy.
    pub fn right(&self) -> Option<f32> {
        self.enemies.iter().map(|e| e.x + e.w).reduce(f32::max)
    }

    /// Bottom edge of the lowest enemy.
    pub fn bottom(&self) -> Option<f32> {
        self.enemies.iter().map(|e| e.y + e.h).reduce(f32::max)
    }
}

// ── Shields ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ShieldPart {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub destroy: bool,
}

/// A square block of destructible parts.
#[derive(Clone, Debug, PartialEq)]
pub struct Shield {
    pub parts: Vec<ShieldPart>,
}

impl Shield {
    /// Build a `grid`×`grid` block of `part_size` squares anchored at (x, y).
    pub fn new(x: f32, y: f32, grid: usize, part_size: f32) -> Self {
        let mut parts = Vec::with_capacity(grid * grid);
        for i in 0..grid {
            for j in 0..grid {
                parts.push(ShieldPart {
                    x: x + i as f32 * part_size,
                    y: y + j as f32 * part_size,
                    w: part_size,
                    h: part_size,
                    destroy: false,
                });
            }
        }
        Self { parts }
    }
}

entity_impls!(Projectile, Player, Enemy, EnemyRow, ShieldPart);
rect_hitbox!(Player, Enemy, ShieldPart);

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game world.  Cloneable so `tick` can hand back a new copy
/// without touching the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub rows: Vec<EnemyRow>,
    pub shields: Vec<Shield>,
    pub score: u32,
    pub level: Level,
    pub status: GameStatus,
    pub frame: u64,
    pub settings: Settings,
}

impl GameState {
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.rows.iter().flat_map(|row| row.enemies.iter())
    }

    pub fn enemy_count(&self) -> usize {
        self.rows.iter().map(|row| row.enemies.len()).sum()
    }
}
