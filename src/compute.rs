/// Game logic.
///
/// `init_state` builds the world and `tick` advances it by one frame,
/// returning a brand-new `GameState`.  The per-entity update functions are
/// public so each behaviour can be driven on its own.  Side effects are
/// limited to the injected RNG.

use rand::Rng;

use crate::config::{ProjectileSettings, Settings};
use crate::entities::{
    where_not_destroyed, BulletOwner, Enemy, EnemyRow, GameState, GameStatus, Level, Player,
    Projectile, RowDirection, Shield,
};
use crate::geometry::{is_circle_rect_colliding, is_rect_rect_colliding};
use crate::input::{Keyboard, Mouse};

// ── Difficulty tables ────────────────────────────────────────────────────────

fn row_speed_factor(level: Level) -> f32 {
    match level {
        Level::Easy => 1.0,
        Level::Medium => 1.5,
        Level::Hard => 2.5,
    }
}

fn fire_chance_factor(level: Level) -> f64 {
    match level {
        Level::Easy => 1.0,
        Level::Medium => 2.0,
        Level::Hard => 4.0,
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_player(settings: &Settings) -> Player {
    let p = &settings.player;
    Player {
        x: settings.width / 2.0 - p.w / 2.0,
        y: settings.height - p.bottom_offset,
        w: p.w,
        h: p.h,
        speed: p.speed,
        cooldown_between_shots: p.cooldown_between_shots,
        current_cooldown: 0,
        destroy: false,
    }
}

/// Build the initial world: the enemy grid, the shields and a fresh player.
pub fn init_state(settings: Settings, level: Level) -> GameState {
    let e = &settings.enemy;
    let speed = e.row_speed * row_speed_factor(level);

    let rows: Vec<EnemyRow> = (0..e.rows)
        .map(|i| {
            let y = i as f32 * (e.h + e.gap_y) + e.offset_y;
            let enemies = (0..e.columns)
                .map(|j| Enemy {
                    x: j as f32 * (e.w + e.gap_x) + e.offset_x,
                    y,
                    w: e.w,
                    h: e.h,
                    cooldown_between_shots: e.cooldown_between_shots,
                    current_cooldown: 0,
                    destroy: false,
                })
                .collect();
            EnemyRow {
                enemies,
                direction: RowDirection::Right,
                speed,
                step_down: e.step_down,
                descended: 0.0,
                destroy: false,
            }
        })
        .collect();

    let s = &settings.shield;
    let shield_y = settings.height - s.bottom_offset;
    let shields: Vec<Shield> = (1..=s.count)
        .map(|i| Shield::new(s.spacing * i as f32, shield_y, s.grid, s.part_size))
        .collect();

    GameState {
        player: new_player(&settings),
        projectiles: Vec::new(),
        rows,
        shields,
        score: 0,
        level,
        status: GameStatus::Playing,
        frame: 0,
        settings,
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Move the player, keep it on the surface and fire when allowed.
///
/// Returns the projectile fired this frame, if any.  A destroyed player does
/// nothing.
pub fn update_player(
    player: &mut Player,
    keyboard: &Keyboard,
    mouse: Option<&Mouse>,
    surface_width: f32,
    projectile: &ProjectileSettings,
) -> Option<Projectile> {
    if player.destroy {
        return None;
    }

    if keyboard.right {
        player.x += player.speed;
    }
    if keyboard.left {
        player.x -= player.speed;
    }
    if let Some(mouse) = mouse {
        if !keyboard.left && !keyboard.right {
            let centre = player.x + player.w / 2.0;
            player.x += (mouse.x - centre).clamp(-player.speed, player.speed);
        }
    }
    if player.x < 0.0 {
        player.x = 0.0;
    }
    if player.x + player.w > surface_width {
        player.x = surface_width - player.w;
    }

    if player.current_cooldown == 0 {
        if keyboard.firing {
            player.current_cooldown = player.cooldown_between_shots;
            return Some(Projectile {
                x: player.x + player.w / 2.0,
                y: player.y,
                r: projectile.radius,
                speed: projectile.player_speed,
                owner: BulletOwner::Player,
                destroy: false,
            });
        }
    } else {
        player.current_cooldown -= 1;
    }
    None
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Advance a projectile and resolve its hits.
///
/// A projectile leaving the surface is destroyed.  Otherwise it is tested
/// against shield parts first, then against the side it was fired at; the
/// first thing it touches is destroyed along with it.  Returns `true` when it
/// took out an enemy.
pub fn update_projectile(
    projectile: &mut Projectile,
    surface_height: f32,
    shields: &mut [Shield],
    player: &mut Player,
    rows: &mut [EnemyRow],
) -> bool {
    projectile.y += projectile.speed;
    projectile.destroy = projectile.y < 0.0 || projectile.y > surface_height;
    if projectile.destroy {
        return false;
    }

    let circle = projectile.circle();

    let part_hit = shields
        .iter_mut()
        .flat_map(|shield| shield.parts.iter_mut())
        .find(|part| !part.destroy && is_circle_rect_colliding(&circle, &**part));
    if let Some(part) = part_hit {
        part.destroy = true;
        projectile.destroy = true;
        return false;
    }

    match projectile.owner {
        BulletOwner::Enemy => {
            if !player.destroy && is_circle_rect_colliding(&circle, &*player) {
                log::debug!("Player hit at ({}, {})", player.x, player.y);
                player.destroy = true;
                projectile.destroy = true;
            }
            false
        }
        BulletOwner::Player => {
            let enemy_hit = rows
                .iter_mut()
                .flat_map(|row| row.enemies.iter_mut())
                .find(|enemy| !enemy.destroy && is_circle_rect_colliding(&circle, &**enemy));
            match enemy_hit {
                Some(enemy) => {
                    log::debug!("Enemy destroyed at ({}, {})", enemy.x, enemy.y);
                    enemy.destroy = true;
                    projectile.destroy = true;
                    true
                }
                None => false,
            }
        }
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Roll for an enemy shot.
///
/// Enemies only roll on frames divisible by `fire_period` and never while
/// cooling down.  Returns the projectile fired, if any.
pub fn update_enemy(
    enemy: &mut Enemy,
    frame: u64,
    fire_period: u64,
    fire_chance: f64,
    projectile: &ProjectileSettings,
    rng: &mut impl Rng,
) -> Option<Projectile> {
    if enemy.current_cooldown == 0 {
        if frame % fire_period.max(1) == 0 && rng.gen_bool(fire_chance.clamp(0.0, 1.0)) {
            enemy.current_cooldown = enemy.cooldown_between_shots;
            return Some(Projectile {
                x: enemy.x + enemy.w / 2.0,
                y: enemy.y + enemy.h,
                r: projectile.radius,
                speed: projectile.enemy_speed,
                owner: BulletOwner::Enemy,
                destroy: false,
            });
        }
    } else {
        enemy.current_cooldown -= 1;
    }
    None
}

/// March a row one frame along its `R → DL → L → DR` cycle.
///
/// Horizontal phases end when the row's outer enemy reaches `edge_margin`
/// from the surface edge; descending phases end after `step_down` units.  An
/// empty row flags itself destroyed instead of moving.
///
/// Each row only looks at its own outer enemies.  Once a row loses its edge
/// enemies it turns later than its neighbours, falls out of step with them
/// and may descend into the row below.
pub fn update_enemy_row(row: &mut EnemyRow, surface_width: f32, edge_margin: f32) {
    let (Some(left), Some(right)) = (row.left(), row.right()) else {
        row.destroy = true;
        return;
    };

    let turn = match row.direction {
        RowDirection::Right => {
            let dx = row.speed.min(surface_width - edge_margin - right).max(0.0);
            row.enemies.iter_mut().for_each(|e| e.x += dx);
            right + dx >= surface_width - edge_margin
        }
        RowDirection::Left => {
            let dx = row.speed.min(left - edge_margin).max(0.0);
            row.enemies.iter_mut().for_each(|e| e.x -= dx);
            left - dx <= edge_margin
        }
        RowDirection::DownLeft | RowDirection::DownRight => {
            let dy = row.speed.min(row.step_down - row.descended).max(0.0);
            row.enemies.iter_mut().for_each(|e| e.y += dy);
            row.descended += dy;
            row.descended >= row.step_down
        }
    };

    if turn {
        row.descended = 0.0;
        row.direction = row.direction.next();
        log::debug!("Row turned {:?}", row.direction);
    }
}

/// Enemies plough through any shield part they touch.
fn erode_shields(rows: &[EnemyRow], shields: &mut [Shield]) {
    for enemy in rows.iter().flat_map(|row| row.enemies.iter()) {
        for part in shields.iter_mut().flat_map(|s| s.parts.iter_mut()) {
            if !part.destroy && is_rect_rect_colliding(enemy, &*part) {
                part.destroy = true;
            }
        }
    }
}

// ── Cleanup & status ─────────────────────────────────────────────────────────

/// Drop every destroyed projectile, enemy, row and shield part.
pub fn cleanup(state: &mut GameState) {
    where_not_destroyed(&mut state.projectiles);
    for row in &mut state.rows {
        where_not_destroyed(&mut row.enemies);
    }
    where_not_destroyed(&mut state.rows);
    for shield in &mut state.shields {
        where_not_destroyed(&mut shield.parts);
    }
}

/// Lost once the player is destroyed or an enemy reaches the player's row;
/// won once every row is gone.
pub fn evaluate_status(state: &GameState) -> GameStatus {
    let player = &state.player;
    let invaded = state
        .enemies()
        .any(|e| e.y + e.h >= player.y || is_rect_rect_colliding(e, player));
    if player.destroy || invaded {
        GameStatus::Lost
    } else if state.rows.is_empty() {
        GameStatus::Won
    } else {
        GameStatus::Playing
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.
///
/// Order: player, projectiles, enemy rows with their enemies, then the
/// cleanup pass, status check and frame counter.  A projectile the player
/// fires moves on the same frame; enemy shots start moving on the next one.
pub fn tick(
    state: &GameState,
    keyboard: &Keyboard,
    mouse: &Mouse,
    rng: &mut impl Rng,
) -> GameState {
    let mut next = state.clone();
    if next.status != GameStatus::Playing {
        return next;
    }
    let settings = &state.settings;

    // ── 1. Player ────────────────────────────────────────────────────────────
    let steering = settings.pointer_steering.then_some(mouse);
    if let Some(shot) = update_player(
        &mut next.player,
        keyboard,
        steering,
        settings.width,
        &settings.projectile,
    ) {
        next.projectiles.push(shot);
    }

    // ── 2. Projectiles ───────────────────────────────────────────────────────
    let mut kills = 0;
    for projectile in next.projectiles.iter_mut() {
        if update_projectile(
            projectile,
            settings.height,
            &mut next.shields,
            &mut next.player,
            &mut next.rows,
        ) {
            kills += 1;
        }
    }
    next.score += kills * settings.score_per_enemy;

    // ── 3. Enemy rows ────────────────────────────────────────────────────────
    let e = &settings.enemy;
    let fire_chance = e.fire_chance * fire_chance_factor(state.level);
    let mut enemy_shots = Vec::new();
    for row in next.rows.iter_mut() {
        update_enemy_row(row, settings.width, e.edge_margin);
        for enemy in row.enemies.iter_mut().filter(|enemy| !enemy.destroy) {
            if let Some(shot) = update_enemy(
                enemy,
                state.frame,
                e.fire_period,
                fire_chance,
                &settings.projectile,
                rng,
            ) {
                enemy_shots.push(shot);
            }
        }
    }
    next.projectiles.extend(enemy_shots);
    erode_shields(&next.rows, &mut next.shields);

    // ── 4. Cleanup, status, frame ────────────────────────────────────────────
    cleanup(&mut next);
    next.status = evaluate_status(&next);
    match next.status {
        GameStatus::Won => log::info!("All invaders destroyed, score {}", next.score),
        GameStatus::Lost => log::info!("Player lost on frame {}", next.frame),
        GameStatus::Playing => {}
    }
    next.frame += 1;
    next
}
