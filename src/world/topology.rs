use std::collections::HashMap;

use glam::Vec3;
use hexasphere::shapes::IcoSphereBase;
use hexasphere::Subdivided;

/// Largest region any tile can have: the tiles sharing a corner with it.
pub const REGION_MAX: usize = 12;

pub const MIN_SUBDIVISION_LEVEL: u32 = 1;
pub const MAX_SUBDIVISION_LEVEL: u32 = 7;

/// Read-only adjacency and geometry for a fixed set of triangular tiles.
///
/// Neighbor order must be stable: island growth claims the first free
/// neighbor, so reordering neighbors changes every generated globe.
pub trait TileGraph {
    fn tile_count(&self) -> usize;

    /// The three tiles sharing an edge with `tile`.
    fn neighbors(&self, tile: usize) -> [usize; 3];

    /// Tiles sharing at least one corner with `tile`, excluding `tile`.
    fn region(&self, tile: usize) -> &[usize];

    fn coords(&self, tile: usize) -> [Vec3; 3];

    /// Outward unit normal of the tile's plane.
    fn normal(&self, tile: usize) -> Vec3;

    /// Latitude of the tile centroid in radians.
    fn latitude(&self, tile: usize) -> f32;
}

/// Fixed-capacity, deduplicated list of region tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    tiles: [usize; REGION_MAX],
    len: usize,
}

impl Region {
    pub const EMPTY: Region = Region {
        tiles: [0; REGION_MAX],
        len: 0,
    };

    /// Append `tile` unless already present. Returns false when full.
    pub fn push(&mut self, tile: usize) -> bool {
        if self.as_slice().contains(&tile) {
            return true;
        }
        if self.len == REGION_MAX {
            return false;
        }
        self.tiles[self.len] = tile;
        self.len += 1;
        true
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.tiles[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Number of tiles on a globe at the given subdivision level: `20 * 4^level`.
pub fn globe_tile_count(level: u32) -> usize {
    20 * 4usize.pow(level)
}

/// Base radius of a globe, chosen so tile edges are roughly one unit long.
pub fn globe_radius(level: u32) -> f32 {
    (1u32 << level) as f32
}

/// Triangle-tiled sphere built by subdividing an icosahedron.
///
/// Tiles are the triangles of the subdivided mesh. Neighbor `k` of a tile is
/// the tile across the edge from corner `k` to corner `k + 1`.
#[derive(Debug, Clone)]
pub struct Globe {
    level: u32,
    radius: f32,
    directions: Vec<Vec3>,
    vertices: Vec<Vec3>,
    corners: Vec<[u32; 3]>,
    vertex_tiles: Vec<Vec<usize>>,
    neighbors: Vec<[usize; 3]>,
    regions: Vec<Region>,
    normals: Vec<Vec3>,
    latitudes: Vec<f32>,
}

impl Globe {
    /// Build the base (unraised) globe.
    ///
    /// # Panics
    /// Panics if `level` is not in 1..=7.
    pub fn new(level: u32) -> Self {
        assert!(
            (MIN_SUBDIVISION_LEVEL..=MAX_SUBDIVISION_LEVEL).contains(&level),
            "Globe subdivision level must be 1-7, got {}",
            level
        );

        // n hexasphere subdivisions split each face into (n+1)^2 triangles.
        let subdivisions = (1usize << level) - 1;
        let sphere = Subdivided::<(), IcoSphereBase>::new(subdivisions, |_| ());
        let directions: Vec<Vec3> = sphere
            .raw_points()
            .iter()
            .map(|p| Vec3::new(p.x, p.y, p.z).normalize())
            .collect();
        let corners: Vec<[u32; 3]> = sphere
            .get_all_indices()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let tile_count = corners.len();

        let mut vertex_tiles: Vec<Vec<usize>> = vec![Vec::with_capacity(6); directions.len()];
        let mut edge_tiles: HashMap<(u32, u32), [usize; 2]> = HashMap::with_capacity(tile_count * 3 / 2);
        for (tile, c) in corners.iter().enumerate() {
            for k in 0..3 {
                vertex_tiles[c[k] as usize].push(tile);
                edge_tiles
                    .entry(edge_key(c[k], c[(k + 1) % 3]))
                    .and_modify(|pair| pair[1] = tile)
                    .or_insert([tile, tile]);
            }
        }

        let mut neighbors = Vec::with_capacity(tile_count);
        let mut regions = Vec::with_capacity(tile_count);
        let mut latitudes = Vec::with_capacity(tile_count);
        for (tile, c) in corners.iter().enumerate() {
            let mut across = [tile; 3];
            for (k, slot) in across.iter_mut().enumerate() {
                let pair = edge_tiles[&edge_key(c[k], c[(k + 1) % 3])];
                *slot = if pair[0] == tile { pair[1] } else { pair[0] };
            }
            neighbors.push(across);

            let mut region = Region::EMPTY;
            for &corner in c {
                for &other in &vertex_tiles[corner as usize] {
                    if other != tile && !region.push(other) {
                        debug_assert!(false, "tile {} region exceeds {}", tile, REGION_MAX);
                    }
                }
            }
            regions.push(region);

            let centroid = c
                .iter()
                .map(|&v| directions[v as usize])
                .sum::<Vec3>()
                .normalize_or_zero();
            latitudes.push(centroid.z.clamp(-1.0, 1.0).asin());
        }

        let radius = globe_radius(level);
        let mut globe = Globe {
            level,
            radius,
            vertices: directions.iter().map(|&d| d * radius).collect(),
            directions,
            corners,
            vertex_tiles,
            neighbors,
            regions,
            normals: vec![Vec3::ZERO; tile_count],
            latitudes,
        };
        globe.refresh_normals();
        globe
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Move every vertex radially outward by the mean height of the tiles
    /// touching it. Missing heights count as zero.
    pub fn raise(&mut self, heights: &[f32]) {
        for (v, tiles) in self.vertex_tiles.iter().enumerate() {
            let lift = if tiles.is_empty() {
                0.0
            } else {
                tiles
                    .iter()
                    .map(|&t| heights.get(t).copied().unwrap_or(0.0))
                    .sum::<f32>()
                    / tiles.len() as f32
            };
            self.vertices[v] = self.directions[v] * (self.radius + lift);
        }
        self.refresh_normals();
    }

    /// Return every vertex to the base sphere.
    pub fn flatten(&mut self) {
        for (vertex, &dir) in self.vertices.iter_mut().zip(&self.directions) {
            *vertex = dir * self.radius;
        }
        self.refresh_normals();
    }

    fn refresh_normals(&mut self) {
        for (normal, c) in self.normals.iter_mut().zip(&self.corners) {
            let [a, b, c] = c.map(|v| self.vertices[v as usize]);
            let n = (b - a).cross(c - a).normalize_or_zero();
            *normal = if n.dot(a + b + c) < 0.0 { -n } else { n };
        }
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

impl TileGraph for Globe {
    fn tile_count(&self) -> usize {
        self.corners.len()
    }

    fn neighbors(&self, tile: usize) -> [usize; 3] {
        self.neighbors[tile]
    }

    fn region(&self, tile: usize) -> &[usize] {
        self.regions[tile].as_slice()
    }

    fn coords(&self, tile: usize) -> [Vec3; 3] {
        self.corners[tile].map(|v| self.vertices[v as usize])
    }

    fn normal(&self, tile: usize) -> Vec3 {
        self.normals[tile]
    }

    fn latitude(&self, tile: usize) -> f32 {
        self.latitudes[tile]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    #[test]
    fn tile_count_formula() {
        assert_eq!(globe_tile_count(1), 80);
        assert_eq!(globe_tile_count(2), 320);
        assert_eq!(globe_tile_count(3), 1280);
        assert_eq!(globe_tile_count(4), 5120);
        assert_eq!(globe_tile_count(5), 20480);
    }

    #[test]
    fn correct_tile_counts() {
        for level in 1..=4 {
            let globe = Globe::new(level);
            assert_eq!(
                globe.tile_count(),
                globe_tile_count(level),
                "Level {} tile count",
                level
            );
        }
    }

    #[test]
    fn neighbors_are_bidirectional() {
        let globe = Globe::new(3);
        for tile in 0..globe.tile_count() {
            for n in globe.neighbors(tile) {
                assert!(
                    globe.neighbors(n).contains(&tile),
                    "Tile {} has neighbor {}, but {} does not have {} as neighbor",
                    tile,
                    n,
                    n,
                    tile
                );
            }
        }
    }

    #[test]
    fn no_self_or_duplicate_neighbors() {
        let globe = Globe::new(3);
        for tile in 0..globe.tile_count() {
            let neighbors = globe.neighbors(tile);
            assert!(!neighbors.contains(&tile), "Tile {} is its own neighbor", tile);
            let unique: HashSet<usize> = neighbors.iter().copied().collect();
            assert_eq!(unique.len(), 3, "Tile {} has duplicate neighbors {:?}", tile, neighbors);
        }
    }

    #[test]
    fn neighbor_k_shares_edge_k() {
        let globe = Globe::new(2);
        for tile in 0..globe.tile_count() {
            let c = globe.corners[tile];
            for (k, n) in globe.neighbors(tile).into_iter().enumerate() {
                let other = globe.corners[n];
                assert!(other.contains(&c[k]) && other.contains(&c[(k + 1) % 3]));
            }
        }
    }

    #[test]
    fn regions_hold_eleven_or_twelve_tiles() {
        let globe = Globe::new(2);
        let mut next_to_pentagon = 0;
        for tile in 0..globe.tile_count() {
            let region = globe.region(tile);
            assert!(!region.contains(&tile), "Tile {} is in its own region", tile);
            for n in globe.neighbors(tile) {
                assert!(region.contains(&n), "Tile {} region misses neighbor {}", tile, n);
            }
            match region.len() {
                12 => {}
                11 => next_to_pentagon += 1,
                len => panic!("Tile {} region has {} tiles", tile, len),
            }
        }
        // 12 pentagonal vertices, 5 tiles around each
        assert_eq!(next_to_pentagon, 60);
    }

    #[test]
    fn all_tiles_reachable() {
        let globe = Globe::new(3);
        let total = globe.tile_count();
        let mut visited = vec![false; total];
        let mut queue = VecDeque::from([0usize]);
        visited[0] = true;
        let mut count = 1;
        while let Some(tile) = queue.pop_front() {
            for n in globe.neighbors(tile) {
                if !visited[n] {
                    visited[n] = true;
                    count += 1;
                    queue.push_back(n);
                }
            }
        }
        assert_eq!(count, total, "Only {} of {} tiles reachable", count, total);
    }

    #[test]
    fn normals_point_outward() {
        let globe = Globe::new(3);
        for tile in 0..globe.tile_count() {
            let n = globe.normal(tile);
            assert!((n.length() - 1.0).abs() < 1e-4, "Tile {} normal not unit", tile);
            let [a, b, c] = globe.coords(tile);
            assert!(n.dot(a + b + c) > 0.0, "Tile {} normal points inward", tile);
        }
    }

    #[test]
    fn latitudes_in_range() {
        let globe = Globe::new(3);
        let half_pi = std::f32::consts::FRAC_PI_2;
        let mut north = false;
        let mut south = false;
        for tile in 0..globe.tile_count() {
            let lat = globe.latitude(tile);
            assert!((-half_pi..=half_pi).contains(&lat), "Tile {} latitude {}", tile, lat);
            north |= lat > 1.2;
            south |= lat < -1.2;
        }
        assert!(north && south, "Expected tiles near both poles");
    }

    #[test]
    fn raise_lifts_and_flatten_restores() {
        let mut globe = Globe::new(2);
        let radius = globe.radius();
        globe.raise(&vec![1.0; globe.tile_count()]);
        for corner in globe.coords(17) {
            assert!((corner.length() - (radius + 1.0)).abs() < 1e-3);
        }
        globe.flatten();
        for corner in globe.coords(17) {
            assert!((corner.length() - radius).abs() < 1e-3);
        }
    }

    #[test]
    fn globe_is_deterministic() {
        let a = Globe::new(3);
        let b = Globe::new(3);
        for tile in 0..a.tile_count() {
            assert_eq!(a.neighbors(tile), b.neighbors(tile));
            assert_eq!(a.region(tile), b.region(tile));
            assert_eq!(a.coords(tile), b.coords(tile));
            assert_eq!(a.latitude(tile).to_bits(), b.latitude(tile).to_bits());
        }
    }

    #[test]
    fn region_push_deduplicates_and_bounds() {
        let mut region = Region::EMPTY;
        assert!(region.push(3));
        assert!(region.push(3));
        assert_eq!(region.as_slice(), &[3]);
        for t in 10..10 + REGION_MAX - 1 {
            assert!(region.push(t));
        }
        assert_eq!(region.len(), REGION_MAX);
        assert!(!region.push(999));
    }
}
