use proptest::prelude::*;

use space_invaders::compute::{new_player, update_enemy, update_enemy_row, update_player, update_projectile};
use space_invaders::config::{ProjectileSettings, Settings};
use space_invaders::entities::*;
use space_invaders::geometry::*;
use space_invaders::input::{Keyboard, Mouse};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn keyboard() -> impl Strategy<Value = Keyboard> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, firing)| Keyboard {
        left,
        right,
        firing,
    })
}

// Integer-valued coordinates keep every intermediate exact in f32.
fn rect() -> impl Strategy<Value = Rect> {
    (-100i32..900, -100i32..600, 1i32..80, 1i32..80)
        .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
}

fn circle() -> impl Strategy<Value = Circle> {
    (-100i32..900, -100i32..600, 1i32..20).prop_map(|(x, y, r)| Circle {
        x: x as f32,
        y: y as f32,
        r: r as f32,
    })
}

proptest! {
    #[test]
    fn player_stays_on_surface(
        start in 0.0f32..=760.0,
        inputs in prop::collection::vec(keyboard(), 0..300),
        pointer in prop::option::of(-200.0f32..1000.0),
    ) {
        let settings = Settings::default();
        let mut player = new_player(&settings);
        player.x = start;
        let mouse = pointer.map(|x| Mouse { x, ..Mouse::default() });
        for kb in &inputs {
            update_player(&mut player, kb, mouse.as_ref(), settings.width, &settings.projectile);
            prop_assert!(player.x >= 0.0);
            prop_assert!(player.x <= settings.width - player.w);
        }
    }

    #[test]
    fn projectile_y_is_monotonic_until_destroyed(
        start in 0.0f32..=500.0,
        speed in prop_oneof![-20.0f32..-0.5, 0.5f32..20.0],
    ) {
        let settings = Settings::default();
        let mut player = new_player(&settings);
        player.destroy = true;
        let mut p = Projectile {
            x: 400.0,
            y: start,
            r: 5.0,
            speed,
            owner: BulletOwner::Enemy,
            destroy: false,
        };
        let mut last = p.y;
        while !p.destroy {
            update_projectile(&mut p, settings.height, &mut [], &mut player, &mut []);
            prop_assert!((p.y - last) * speed > 0.0);
            last = p.y;
        }
        prop_assert!(p.y < 0.0 || p.y > settings.height);
    }

    #[test]
    fn rect_rect_is_symmetric(a in rect(), b in rect()) {
        prop_assert_eq!(is_rect_rect_colliding(&a, &b), is_rect_rect_colliding(&b, &a));
    }

    #[test]
    fn rect_rect_matches_interval_overlap(a in rect(), b in rect()) {
        let overlap_x = a.x <= b.x + b.w && b.x <= a.x + a.w;
        let overlap_y = a.y <= b.y + b.h && b.y <= a.y + a.h;
        prop_assert_eq!(is_rect_rect_colliding(&a, &b), overlap_x && overlap_y);
    }

    #[test]
    fn circle_rect_matches_closest_point(c in circle(), r in rect()) {
        let nearest_x = c.x.clamp(r.x, r.x + r.w);
        let nearest_y = c.y.clamp(r.y, r.y + r.h);
        let dx = c.x - nearest_x;
        let dy = c.y - nearest_y;
        prop_assert_eq!(is_circle_rect_colliding(&c, &r), dx * dx + dy * dy <= c.r * c.r);
    }

    #[test]
    fn circle_rect_is_mirror_symmetric(c in circle(), r in rect()) {
        let mirrored_c = Circle { x: -c.x, ..c };
        let mirrored_r = Rect::new(-r.x - r.w, r.y, r.w, r.h);
        prop_assert_eq!(
            is_circle_rect_colliding(&c, &r),
            is_circle_rect_colliding(&mirrored_c, &mirrored_r)
        );
    }

    #[test]
    fn player_fire_is_rate_limited(
        cooldown in 0u32..60,
        triggers in prop::collection::vec(any::<bool>(), 1..400),
    ) {
        let mut settings = Settings::default();
        settings.player.cooldown_between_shots = cooldown;
        let mut player = new_player(&settings);
        let mut shots = Vec::new();
        for (frame, &firing) in triggers.iter().enumerate() {
            let kb = Keyboard { firing, ..Keyboard::default() };
            if update_player(&mut player, &kb, None, settings.width, &settings.projectile).is_some() {
                shots.push(frame);
            }
        }
        for pair in shots.windows(2) {
            prop_assert!(pair[1] - pair[0] > cooldown as usize);
        }
    }

    #[test]
    fn enemy_fire_is_rate_limited(cooldown in 0u32..60, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut enemy = Enemy {
            x: 0.0,
            y: 0.0,
            w: 30.0,
            h: 30.0,
            cooldown_between_shots: cooldown,
            current_cooldown: 0,
            destroy: false,
        };
        let ps = ProjectileSettings::default();
        let mut shots = Vec::new();
        for frame in 0..400u64 {
            if update_enemy(&mut enemy, frame, 1, 0.5, &ps, &mut rng).is_some() {
                shots.push(frame);
            }
        }
        for pair in shots.windows(2) {
            prop_assert!(pair[1] - pair[0] > cooldown as u64);
        }
    }

    #[test]
    fn row_without_enemies_self_destroys(
        direction in prop_oneof![
            Just(RowDirection::Right),
            Just(RowDirection::DownLeft),
            Just(RowDirection::Left),
            Just(RowDirection::DownRight),
        ],
        speed in 0.5f32..5.0,
    ) {
        let mut row = EnemyRow {
            enemies: Vec::new(),
            direction,
            speed,
            step_down: 20.0,
            descended: 0.0,
            destroy: false,
        };
        update_enemy_row(&mut row, 800.0, 10.0);
        prop_assert!(row.destroy);
    }
}
