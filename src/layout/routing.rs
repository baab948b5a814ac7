use super::NodeLayout;

/// Straight connector between two cells.
///
/// Nodes on the same row connect side to side; across rows the connector
/// leaves the bottom of the upper node and enters the top of the lower one.
pub(super) fn route_edge(from: &NodeLayout, to: &NodeLayout) -> Vec<(f32, f32)> {
    let (from_cx, from_cy) = from.center();
    let (to_cx, to_cy) = to.center();

    if from.pos.row == to.pos.row {
        let (start_x, end_x) = if to.x >= from.x {
            (from.x + from.width, to.x)
        } else {
            (from.x, to.x + to.width)
        };
        return vec![(start_x, from_cy), (end_x, to_cy)];
    }

    let (start_y, end_y) = if to.y >= from.y {
        (from.y + from.height, to.y)
    } else {
        (from.y, to.y + to.height)
    };
    if (from_cx - to_cx).abs() < f32::EPSILON {
        return vec![(from_cx, start_y), (to_cx, end_y)];
    }
    let mid_y = (start_y + end_y) / 2.0;
    vec![
        (from_cx, start_y),
        (from_cx, mid_y),
        (to_cx, mid_y),
        (to_cx, end_y),
    ]
}
