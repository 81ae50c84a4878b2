//! Planar bearing geometry.
//!
//! Positions are classified into one of eight compass octants by the angle
//! `atan2(dy, dx)`, with east at 0 degrees and north at 90. Each octant is
//! 45 degrees wide and centred on its compass bearing:
//!
//! | Bearing | Sector (degrees)          |
//! |---------|---------------------------|
//! | E       | `[337.5, 360) U [0, 22.5)`|
//! | NE      | `[22.5, 67.5)`            |
//! | N       | `[67.5, 112.5)`           |
//! | NW      | `[112.5, 157.5)`          |
//! | W       | `[157.5, 202.5)`          |
//! | SW      | `[202.5, 247.5)`          |
//! | S       | `[247.5, 292.5)`          |
//! | SE      | `[292.5, 337.5)`          |
//!
//! Elevation is ignored throughout.

use ringflow_types::{Bearing, Position};
use rust_decimal::prelude::ToPrimitive;

/// Planar `(x, y)` coordinates of a position as `f64`.
pub fn planar(position: &Position) -> (f64, f64) {
    (
        position.x.to_f64().unwrap_or_default(),
        position.y.to_f64().unwrap_or_default(),
    )
}

/// Straight-line distance between two positions, ignoring elevation.
pub fn planar_distance(a: &Position, b: &Position) -> f64 {
    let (ax, ay) = planar(a);
    let (bx, by) = planar(b);
    (bx - ax).hypot(by - ay)
}

/// Map an angle in degrees (any range) to its octant.
pub fn classify_angle(degrees: f64) -> Bearing {
    let angle = degrees.rem_euclid(360.0);
    if !(22.5..337.5).contains(&angle) {
        Bearing::East
    } else if angle < 67.5 {
        Bearing::NorthEast
    } else if angle < 112.5 {
        Bearing::North
    } else if angle < 157.5 {
        Bearing::NorthWest
    } else if angle < 202.5 {
        Bearing::West
    } else if angle < 247.5 {
        Bearing::SouthWest
    } else if angle < 292.5 {
        Bearing::South
    } else {
        Bearing::SouthEast
    }
}

/// Octant of the planar offset `(dx, dy)`, or `None` for a zero offset.
///
/// Offsets in the lower half-plane are classified through their negation,
/// so `offset_bearing(-dx, -dy)` is always the opposite of
/// `offset_bearing(dx, dy)`, including on sector boundaries.
pub fn offset_bearing(dx: f64, dy: f64) -> Option<Bearing> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    if dy < 0.0 || (dy == 0.0 && dx < 0.0) {
        return Some(opposite(classify_angle((-dy).atan2(-dx).to_degrees())));
    }
    Some(classify_angle(dy.atan2(dx).to_degrees()))
}

/// Octant of `to` as seen from `from`. `None` when the two coincide in plan.
pub fn bearing(from: &Position, to: &Position) -> Option<Bearing> {
    let (fx, fy) = planar(from);
    let (tx, ty) = planar(to);
    offset_bearing(tx - fx, ty - fy)
}

/// The bearing pointing the other way.
pub const fn opposite(bearing: Bearing) -> Bearing {
    match bearing {
        Bearing::North => Bearing::South,
        Bearing::NorthEast => Bearing::SouthWest,
        Bearing::East => Bearing::West,
        Bearing::SouthEast => Bearing::NorthWest,
        Bearing::South => Bearing::North,
        Bearing::SouthWest => Bearing::NorthEast,
        Bearing::West => Bearing::East,
        Bearing::NorthWest => Bearing::SouthEast,
    }
}

/// The bearing and its two neighbours at +/-45 degrees, bearing first.
pub const fn tolerance(bearing: Bearing) -> [Bearing; 3] {
    match bearing {
        Bearing::North => [Bearing::North, Bearing::NorthWest, Bearing::NorthEast],
        Bearing::NorthEast => [Bearing::NorthEast, Bearing::North, Bearing::East],
        Bearing::East => [Bearing::East, Bearing::NorthEast, Bearing::SouthEast],
        Bearing::SouthEast => [Bearing::SouthEast, Bearing::East, Bearing::South],
        Bearing::South => [Bearing::South, Bearing::SouthEast, Bearing::SouthWest],
        Bearing::SouthWest => [Bearing::SouthWest, Bearing::South, Bearing::West],
        Bearing::West => [Bearing::West, Bearing::SouthWest, Bearing::NorthWest],
        Bearing::NorthWest => [Bearing::NorthWest, Bearing::West, Bearing::North],
    }
}

/// Whether `candidate` lies roughly along `direction`.
pub fn within_tolerance(direction: Bearing, candidate: Bearing) -> bool {
    tolerance(direction).contains(&candidate)
}

/// Whether `to` lies roughly in `direction` from `from`.
pub fn is_in_general_direction(from: &Position, to: &Position, direction: Bearing) -> bool {
    bearing(from, to).is_some_and(|b| within_tolerance(direction, b))
}

/// Unit vector of a bearing in `(east, north)` components.
pub const fn unit_vector(bearing: Bearing) -> (f64, f64) {
    use core::f64::consts::FRAC_1_SQRT_2 as D;
    match bearing {
        Bearing::North => (0.0, 1.0),
        Bearing::NorthEast => (D, D),
        Bearing::East => (1.0, 0.0),
        Bearing::SouthEast => (D, -D),
        Bearing::South => (0.0, -1.0),
        Bearing::SouthWest => (-D, -D),
        Bearing::West => (-1.0, 0.0),
        Bearing::NorthWest => (-D, D),
    }
}

/// Signed distance of a position along `bearing`, measured from the origin.
///
/// Comparing two positions' projections tells which is farther along a
/// mining direction.
pub fn projection(position: &Position, bearing: Bearing) -> f64 {
    let (x, y) = planar(position);
    let (ux, uy) = unit_vector(bearing);
    x.mul_add(ux, y * uy)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn pos(x: Decimal, y: Decimal) -> Position {
        Position::new(x, y, Decimal::ZERO)
    }

    #[test]
    fn cardinal_and_diagonal_offsets() {
        let origin = pos(dec!(0), dec!(0));
        let cases = [
            (dec!(10), dec!(0), Bearing::East),
            (dec!(10), dec!(10), Bearing::NorthEast),
            (dec!(0), dec!(10), Bearing::North),
            (dec!(-10), dec!(10), Bearing::NorthWest),
            (dec!(-10), dec!(0), Bearing::West),
            (dec!(-10), dec!(-10), Bearing::SouthWest),
            (dec!(0), dec!(-10), Bearing::South),
            (dec!(10), dec!(-10), Bearing::SouthEast),
        ];
        for (x, y, expected) in cases {
            assert_eq!(bearing(&origin, &pos(x, y)), Some(expected), "({x}, {y})");
        }
    }

    #[test]
    fn coincident_positions_have_no_bearing() {
        let a = pos(dec!(3.5), dec!(-2));
        let mut b = a;
        b.z = dec!(-40);
        assert_eq!(bearing(&a, &b), None);
    }

    #[test]
    fn every_angle_maps_to_exactly_the_expected_sector() {
        // Tenth-degree sweep over [0, 360).
        for tenth in 0_u32..3600 {
            let angle = f64::from(tenth) / 10.0;
            let got = classify_angle(angle);
            let shifted = (angle + 22.5).rem_euclid(360.0);
            let sector = (shifted / 45.0).floor() as usize;
            // Angles grow counter-clockwise from east.
            let ccw = [
                Bearing::East,
                Bearing::NorthEast,
                Bearing::North,
                Bearing::NorthWest,
                Bearing::West,
                Bearing::SouthWest,
                Bearing::South,
                Bearing::SouthEast,
            ];
            assert_eq!(Some(&got), ccw.get(sector), "angle {angle}");
        }
    }

    #[test]
    fn sector_boundaries_belong_to_the_upper_sector() {
        assert_eq!(classify_angle(22.5), Bearing::NorthEast);
        assert_eq!(classify_angle(22.499), Bearing::East);
        assert_eq!(classify_angle(337.5), Bearing::East);
        assert_eq!(classify_angle(337.499), Bearing::SouthEast);
        assert_eq!(classify_angle(0.0), Bearing::East);
        assert_eq!(classify_angle(360.0), Bearing::East);
        assert_eq!(classify_angle(-90.0), Bearing::South);
    }

    #[test]
    fn bearing_is_antisymmetric_for_random_points() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let a = pos(
                Decimal::new(rng.random_range(-50_000..50_000), 2),
                Decimal::new(rng.random_range(-50_000..50_000), 2),
            );
            let b = pos(
                Decimal::new(rng.random_range(-50_000..50_000), 2),
                Decimal::new(rng.random_range(-50_000..50_000), 2),
            );
            if a.x == b.x && a.y == b.y {
                continue;
            }
            let forward = bearing(&a, &b).unwrap();
            let backward = bearing(&b, &a).unwrap();
            assert_eq!(forward, opposite(backward), "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn bearing_is_antisymmetric_on_axes_and_diagonals() {
        let offsets = [
            (1.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (-1.0, 1.0),
            (3.0, 0.0),
            (2.5, 1.0),
        ];
        for (dx, dy) in offsets {
            let forward = offset_bearing(dx, dy).unwrap();
            let backward = offset_bearing(-dx, -dy).unwrap();
            assert_eq!(forward, opposite(backward), "({dx}, {dy})");
        }
    }

    #[test]
    fn opposite_is_an_involution_without_fixed_points() {
        for b in Bearing::ALL {
            assert_eq!(opposite(opposite(b)), b);
            assert_ne!(opposite(b), b);
        }
    }

    #[test]
    fn tolerance_holds_bearing_and_both_neighbours() {
        for b in Bearing::ALL {
            let set = tolerance(b);
            assert_eq!(set[0], b);
            let ordinals: Vec<usize> = set.iter().map(|t| t.ordinal()).collect();
            let me = b.ordinal();
            assert!(ordinals.contains(&((me + 1) % 8)));
            assert!(ordinals.contains(&((me + 7) % 8)));
            assert!(!within_tolerance(b, opposite(b)));
        }
    }

    #[test]
    fn planar_distance_ignores_elevation() {
        let a = Position::new(dec!(0), dec!(0), dec!(100));
        let b = Position::new(dec!(3), dec!(4), dec!(-250));
        assert!((planar_distance(&a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn projection_orders_points_along_a_bearing() {
        let near = pos(dec!(1), dec!(1));
        let far = pos(dec!(5), dec!(4));
        assert!(projection(&far, Bearing::NorthEast) > projection(&near, Bearing::NorthEast));
        assert!(projection(&far, Bearing::SouthWest) < projection(&near, Bearing::SouthWest));
    }
}
