/// Overlap predicates for the two shapes the game knows about.
///
/// Rectangles are axis-aligned with their origin in the top-left corner,
/// circles are described by their centre.  Every rectangular entity exposes
/// its bounds through [`Hitbox`] so the predicates work on entities directly.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

/// Anything with an axis-aligned bounding rectangle.
pub trait Hitbox {
    fn hitbox(&self) -> Rect;
}

impl Hitbox for Rect {
    fn hitbox(&self) -> Rect {
        *self
    }
}

/// True when the circle and the rectangle overlap.  Touching counts.
pub fn is_circle_rect_colliding(circle: &Circle, rect: &impl Hitbox) -> bool {
    let rect = rect.hitbox();
    let half_w = rect.w / 2.0;
    let half_h = rect.h / 2.0;

    let dist_x = (circle.x - rect.x - half_w).abs();
    let dist_y = (circle.y - rect.y - half_h).abs();

    if dist_x > half_w + circle.r || dist_y > half_h + circle.r {
        return false;
    }
    if dist_x <= half_w || dist_y <= half_h {
        return true;
    }

    // Centre lies diagonally off a corner
    let dx = dist_x - half_w;
    let dy = dist_y - half_h;
    dx * dx + dy * dy <= circle.r * circle.r
}

/// True when the two rectangles overlap.  Shared edges count.
pub fn is_rect_rect_colliding(first: &impl Hitbox, second: &impl Hitbox) -> bool {
    let a = first.hitbox();
    let b = second.hitbox();
    !(a.x > b.right() || a.right() < b.x || a.y > b.bottom() || a.bottom() < b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_inside_rect() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert!(is_circle_rect_colliding(&Circle { x: 20.0, y: 10.0, r: 5.0 }, &rect));
    }

    #[test]
    fn circle_touching_edge() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert!(is_circle_rect_colliding(&Circle { x: 45.0, y: 10.0, r: 5.0 }, &rect));
        assert!(!is_circle_rect_colliding(&Circle { x: 45.5, y: 10.0, r: 5.0 }, &rect));
    }

    #[test]
    fn circle_near_corner_uses_distance() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // 3-4-5 triangle off the bottom-right corner
        assert!(is_circle_rect_colliding(&Circle { x: 13.0, y: 14.0, r: 5.0 }, &rect));
        // inside the bounding square but outside the rounded corner
        assert!(!is_circle_rect_colliding(&Circle { x: 14.0, y: 14.0, r: 5.0 }, &rect));
    }

    #[test]
    fn rects_sharing_an_edge_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(is_rect_rect_colliding(&a, &b));
        let c = Rect::new(10.5, 0.0, 10.0, 10.0);
        assert!(!is_rect_rect_colliding(&a, &c));
    }

    #[test]
    fn rect_contained_in_other() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(is_rect_rect_colliding(&outer, &inner));
        assert!(is_rect_rect_colliding(&inner, &outer));
    }
}
