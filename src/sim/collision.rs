//! Overlap tests between the player circle and token circles / slot rects
//!
//! All shapes are axis-aligned or circular; squared distances are used to
//! avoid square roots in the per-tick sweep.

use glam::Vec2;

use crate::dist_sq;

/// Circle-circle overlap
#[inline]
pub fn circle_circle(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    dist_sq(a_pos, b_pos) <= reach * reach
}

/// Circle vs axis-aligned rect given by center and half extents
#[inline]
pub fn circle_rect(c_pos: Vec2, c_radius: f32, r_center: Vec2, r_half: Vec2) -> bool {
    let closest = Vec2::new(
        c_pos.x.clamp(r_center.x - r_half.x, r_center.x + r_half.x),
        c_pos.y.clamp(r_center.y - r_half.y, r_center.y + r_half.y),
    );
    dist_sq(c_pos, closest) <= c_radius * c_radius
}

/// Index of the overlapping circle nearest to `origin`, if any
///
/// Tie-break when several qualify in the same tick: nearest wins.
pub fn nearest_overlap(
    origin: Vec2,
    origin_radius: f32,
    targets: impl Iterator<Item = (usize, Vec2, f32)>,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, pos, radius) in targets {
        if !circle_circle(origin, origin_radius, pos, radius) {
            continue;
        }
        let d = dist_sq(origin, pos);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((index, d));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_touching() {
        assert!(circle_circle(
            Vec2::new(0.0, 0.0),
            10.0,
            Vec2::new(19.0, 0.0),
            10.0
        ));
        assert!(!circle_circle(
            Vec2::new(0.0, 0.0),
            10.0,
            Vec2::new(21.0, 0.0),
            10.0
        ));
    }

    #[test]
    fn test_circle_rect_corner() {
        let half = Vec2::new(20.0, 20.0);
        // Circle near a corner, just inside reach
        assert!(circle_rect(Vec2::new(25.0, 25.0), 8.0, Vec2::ZERO, half));
        // Clearly past the corner
        assert!(!circle_rect(Vec2::new(30.0, 30.0), 8.0, Vec2::ZERO, half));
    }

    #[test]
    fn test_nearest_overlap_picks_closest() {
        let targets = vec![
            (0, Vec2::new(30.0, 0.0), 22.0),
            (1, Vec2::new(12.0, 0.0), 22.0),
            (2, Vec2::new(500.0, 0.0), 22.0),
        ];
        let hit = nearest_overlap(Vec2::ZERO, 18.0, targets.into_iter());
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn test_nearest_overlap_none_in_reach() {
        let targets = vec![(0, Vec2::new(500.0, 500.0), 22.0)];
        assert_eq!(nearest_overlap(Vec2::ZERO, 18.0, targets.into_iter()), None);
    }
}
