use geo_types::coord;

use crate::geometry::Quad;

/// Splits a detector output row `[x0, y0, x1, y1, x2, y2, x3, y3, score]`.
pub(crate) fn vec_to_quad(v: &[f32]) -> (Quad, f32) {
    let quad = [
        coord! { x: v[0], y: v[1] },
        coord! { x: v[2], y: v[3] },
        coord! { x: v[4], y: v[5] },
        coord! { x: v[6], y: v[7] },
    ];
    (quad, v[8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_splits_into_corners_and_score() {
        let (quad, score) = vec_to_quad(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.5]);
        assert_eq!(quad[2], coord! { x: 5.0, y: 6.0 });
        assert_eq!(score, 0.5);
    }
}
