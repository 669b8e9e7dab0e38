use glam::{Vec2, Vec3};

use crate::world::topology::TileGraph;
use crate::world::WorldState;

/// Which tile, if any, the pointer ray is resting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(usize),
}

impl Selection {
    pub fn tile(self) -> Option<usize> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(tile) => Some(tile),
        }
    }
}

fn dominant_axis(v: Vec3) -> usize {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    }
}

/// Drop `axis` from `v`.
fn project(v: Vec3, axis: usize) -> Vec2 {
    match axis {
        0 => Vec2::new(v.y, v.z),
        1 => Vec2::new(v.z, v.x),
        _ => Vec2::new(v.x, v.y),
    }
}

/// Returns true if the ray from `origin` along `direction` strikes the front
/// face of the triangle.
///
/// The ray is intersected with the triangle's plane. The hit point is then
/// projected by dropping the axis where the normal is largest, keeping the
/// other two, and tested with barycentric coordinates. Rays parallel to the plane, leaving
/// it, or starting behind it miss.
pub fn ray_intersects_triangle(origin: Vec3, direction: Vec3, corners: [Vec3; 3], normal: Vec3) -> bool {
    let denom = -normal.dot(direction);
    if denom <= 0.0 {
        return false;
    }
    let o = origin - corners[0];
    let t = normal.dot(o) / denom;
    if t <= 0.0 || !t.is_finite() {
        return false;
    }
    let p = o + direction * t;

    let axis = dominant_axis(normal);
    let q = project(p, axis);
    let b = project(corners[1] - corners[0], axis);
    let c = project(corners[2] - corners[0], axis);

    // Degenerate triangles give NaN here and fail every comparison.
    let b_cross_c = b.perp_dot(c);
    let u = q.perp_dot(c) / b_cross_c;
    let v = q.perp_dot(b) / -b_cross_c;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

impl<M> WorldState<M> {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Number of ray/tile tests performed so far.
    pub fn ray_tests(&self) -> u64 {
        self.ray_tests
    }

    pub fn ray_intersects_tile<G: TileGraph>(&mut self, graph: &G, origin: Vec3, direction: Vec3, tile: usize) -> bool {
        self.ray_tests += 1;
        ray_intersects_triangle(origin, direction, graph.coords(tile), graph.normal(tile))
    }

    /// Find the visible tile under a pointer ray and select it.
    ///
    /// A selected tile that is still visible and still hit stays selected
    /// without scanning the globe. Otherwise the hit closest to the viewer
    /// along the camera axis of the last [`WorldState::update_visibility`]
    /// call wins, earliest index first on ties.
    pub fn pick<G: TileGraph>(&mut self, graph: &G, origin: Vec3, direction: Vec3) -> Option<usize> {
        if let Selection::Selected(tile) = self.selection {
            if self.is_visible(tile) && self.ray_intersects_tile(graph, origin, direction, tile) {
                return Some(tile);
            }
        }

        // Without a camera the ray itself is the depth axis.
        let axis = if self.camera_forward == Vec3::ZERO {
            direction
        } else {
            self.camera_forward
        };

        let mut best: Option<(usize, f32)> = None;
        for tile in 0..self.tiles.len() {
            if !self.is_visible(tile) || !self.ray_intersects_tile(graph, origin, direction, tile) {
                continue;
            }
            let z = axis.dot(self.tiles[tile].origin);
            if best.is_none_or(|(_, best_z)| z < best_z) {
                best = Some((tile, z));
            }
        }

        let picked = best.map(|(tile, _)| tile);
        self.select_tile(picked);
        picked
    }

    /// Change the selection and keep model highlight flags in step.
    pub fn select_tile(&mut self, tile: Option<usize>) {
        let tile = tile.filter(|&t| t < self.tiles.len());
        if let Some(old) = self.selection.tile() {
            if let Some(model) = self.display.get_mut(old).and_then(|d| d.model.as_mut()) {
                model.selected = false;
            }
        }
        if let Some(new) = tile {
            if let Some(model) = self.display[new].model.as_mut() {
                model.selected = true;
            }
        }
        self.selection = match tile {
            Some(t) => Selection::Selected(t),
            None => Selection::Unselected,
        };
    }

    /// The pointer ray is known to miss the globe.
    pub fn clear_selection(&mut self) {
        self.select_tile(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::testing::TokenLoader;
    use crate::world::topology::Globe;
    use std::rc::Rc;

    /// Identical triangles stacked along +z at the given heights.
    struct Stack {
        heights: Vec<f32>,
    }

    impl TileGraph for Stack {
        fn tile_count(&self) -> usize {
            self.heights.len()
        }
        fn neighbors(&self, tile: usize) -> [usize; 3] {
            [tile; 3]
        }
        fn region(&self, _tile: usize) -> &[usize] {
            &[]
        }
        fn coords(&self, tile: usize) -> [Vec3; 3] {
            let z = self.heights[tile];
            [Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z), Vec3::new(0.0, 1.0, z)]
        }
        fn normal(&self, _tile: usize) -> Vec3 {
            Vec3::Z
        }
        fn latitude(&self, _tile: usize) -> f32 {
            0.0
        }
    }

    fn stack_state(heights: &[f32]) -> (Stack, WorldState<Rc<()>>) {
        let graph = Stack {
            heights: heights.to_vec(),
        };
        let mut state = WorldState::new();
        state.reset(heights.len());
        state.compute_geometry(&graph);
        state.update_visibility(Vec3::NEG_Z, f32::MAX, 0.0);
        (graph, state)
    }

    fn globe_state(level: u32) -> (Globe, WorldState) {
        let globe = Globe::new(level);
        let mut state = WorldState::new();
        state.reset(globe.tile_count());
        state.compute_geometry(&globe);
        state.set_all_visible(true);
        (globe, state)
    }

    #[test]
    fn centroid_ray_along_inward_normal_hits() {
        let (globe, state) = globe_state(2);
        for tile in 0..globe.tile_count() {
            let n = globe.normal(tile);
            let origin = state.tiles()[tile].origin + n * 5.0;
            assert!(
                ray_intersects_triangle(origin, -n, globe.coords(tile), n),
                "Tile {} missed by its own centroid ray",
                tile
            );
        }
    }

    #[test]
    fn parallel_and_backward_rays_miss() {
        let corners = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let above = Vec3::new(0.2, 0.2, 1.0);
        assert!(ray_intersects_triangle(above, Vec3::NEG_Z, corners, Vec3::Z));
        assert!(!ray_intersects_triangle(above, Vec3::X, corners, Vec3::Z));
        assert!(!ray_intersects_triangle(above, Vec3::Z, corners, Vec3::Z));
        // Behind the plane looking away from it
        let below = Vec3::new(0.2, 0.2, -1.0);
        assert!(!ray_intersects_triangle(below, Vec3::NEG_Z, corners, Vec3::Z));
        // Outside the triangle bounds
        let beside = Vec3::new(0.8, 0.8, 1.0);
        assert!(!ray_intersects_triangle(beside, Vec3::NEG_Z, corners, Vec3::Z));
    }

    #[test]
    fn degenerate_triangle_misses() {
        let corners = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert!(!ray_intersects_triangle(Vec3::new(0.5, 0.0, 1.0), Vec3::NEG_Z, corners, Vec3::Z));
    }

    #[test]
    fn ray_into_empty_space_selects_nothing() {
        let (globe, mut state) = globe_state(2);
        for dir in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, 1.0, 1.0).normalize()] {
            let origin = dir * globe.radius() * 3.0;
            assert_eq!(state.pick(&globe, origin, dir), None);
            assert_eq!(state.selection(), Selection::Unselected);
        }
    }

    #[test]
    fn ray_from_space_hits_the_facing_tile() {
        let (globe, mut state) = globe_state(3);
        let target = 100;
        let origin = state.tiles()[target].origin * 4.0;
        let direction = -state.tiles()[target].origin.normalize();
        let picked = state.pick(&globe, origin, direction);
        assert_eq!(picked, Some(target));
        assert_eq!(state.selection(), Selection::Selected(target));
    }

    #[test]
    fn nearest_tile_wins() {
        let (graph, mut state) = stack_state(&[1.0, 3.0, 2.0]);
        let picked = state.pick(&graph, Vec3::new(0.25, 0.25, 10.0), Vec3::NEG_Z);
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn depth_ties_go_to_lowest_index() {
        let (graph, mut state) = stack_state(&[1.0, 2.0, 2.0]);
        let picked = state.pick(&graph, Vec3::new(0.25, 0.25, 10.0), Vec3::NEG_Z);
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn invisible_tiles_are_skipped() {
        let (graph, mut state) = stack_state(&[1.0, 3.0, 2.0]);
        state.set_visible(1, false).unwrap();
        let picked = state.pick(&graph, Vec3::new(0.25, 0.25, 10.0), Vec3::NEG_Z);
        assert_eq!(picked, Some(2));
    }

    #[test]
    fn held_selection_skips_the_scan() {
        let (graph, mut state) = stack_state(&[1.0, 3.0, 2.0, 0.5, 0.25]);
        let origin = Vec3::new(0.25, 0.25, 10.0);
        assert_eq!(state.pick(&graph, origin, Vec3::NEG_Z), Some(1));
        assert_eq!(state.ray_tests(), 5);

        let nudged = Vec3::new(0.3, 0.2, 10.0);
        assert_eq!(state.pick(&graph, nudged, Vec3::NEG_Z), Some(1));
        assert_eq!(state.ray_tests(), 6, "Held selection must cost one test");
    }

    #[test]
    fn lost_selection_rescans() {
        let (graph, mut state) = stack_state(&[1.0, 3.0]);
        let origin = Vec3::new(0.25, 0.25, 10.0);
        assert_eq!(state.pick(&graph, origin, Vec3::NEG_Z), Some(1));
        let away = Vec3::new(5.0, 5.0, 10.0);
        assert_eq!(state.pick(&graph, away, Vec3::NEG_Z), None);
        assert_eq!(state.ray_tests(), 2 + 1 + 2);
        assert_eq!(state.selection(), Selection::Unselected);
    }

    #[test]
    fn selection_flags_follow_models() {
        let (graph, mut state) = stack_state(&[1.0, 3.0]);
        let mut loader = TokenLoader::new();
        state.set_tile_model(0, "a", &mut loader).unwrap();
        state.set_tile_model(1, "b", &mut loader).unwrap();

        state.pick(&graph, Vec3::new(0.25, 0.25, 10.0), Vec3::NEG_Z);
        assert!(state.model(1).unwrap().selected);
        assert!(!state.model(0).unwrap().selected);

        state.select_tile(Some(0));
        assert!(state.model(0).unwrap().selected);
        assert!(!state.model(1).unwrap().selected);

        state.clear_selection();
        assert!(!state.model(0).unwrap().selected);
        assert_eq!(state.selection(), Selection::Unselected);
    }

    #[test]
    fn model_placed_on_selected_tile_is_highlighted() {
        let (_, mut state) = stack_state(&[1.0]);
        let mut loader = TokenLoader::new();
        state.select_tile(Some(0));
        state.set_tile_model(0, "a", &mut loader).unwrap();
        assert!(state.model(0).unwrap().selected);
    }
}
