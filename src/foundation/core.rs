pub use kurbo::{Affine, Point, Rect, Vec2};

/// Logical canvas width of a card, in pixels.
pub const CARD_WIDTH: u32 = 700;
/// Logical canvas height of a card, in pixels.
pub const CARD_HEIGHT: u32 = 1050;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// The portrait card canvas (700x1050).
    pub const CARD: Canvas = Canvas {
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
    };

    /// Full-canvas destination rectangle, top-left origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::CARD
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Rotation of `degrees` (clockwise on a y-down canvas) pivoted about `pivot`.
///
/// Equivalent to translate-to-pivot, rotate, translate-back, so content drawn at
/// `pivot` turns about that exact point instead of the canvas origin.
pub fn rotation_about(degrees: f64, pivot: Point) -> Affine {
    let t_pivot = Affine::translate(pivot.to_vec2());
    let t_rotate = Affine::rotate(degrees.to_radians());
    let t_unpivot = Affine::translate(-pivot.to_vec2());
    t_pivot * t_rotate * t_unpivot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn card_canvas_rect_covers_full_card() {
        assert_eq!(Canvas::default(), Canvas::CARD);
        assert_eq!(Canvas::CARD.rect(), Rect::new(0.0, 0.0, 700.0, 1050.0));
    }

    #[test]
    fn rotation_keeps_pivot_fixed() {
        let pivot = Point::new(50.0, 60.0);
        let t = rotation_about(37.0, pivot);
        assert!(approx(t * pivot, pivot));
    }

    #[test]
    fn quarter_turn_is_clockwise_on_screen() {
        let pivot = Point::new(10.0, 10.0);
        let t = rotation_about(90.0, pivot);
        // A point to the right of the pivot ends up below it (y grows downward).
        assert!(approx(t * Point::new(20.0, 10.0), Point::new(10.0, 20.0)));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let t = rotation_about(0.0, Point::new(3.0, 4.0));
        assert!(approx(t * Point::new(7.0, 1.0), Point::new(7.0, 1.0)));
    }

    #[test]
    fn premul_from_straight() {
        let c = Rgba8Premul::from_straight_rgba(255, 0, 100, 128);
        assert_eq!(c.to_array(), [128, 0, 50, 128]);
    }
}
