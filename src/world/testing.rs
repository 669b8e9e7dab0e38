//! Hand-built tile graphs for exercising generation rules in isolation.

use glam::Vec3;

use crate::world::topology::TileGraph;

/// A tile graph whose adjacency is spelled out by the test.
pub struct FakeGraph {
    pub neighbors: Vec<[usize; 3]>,
    pub regions: Vec<Vec<usize>>,
    pub latitudes: Vec<f32>,
}

impl FakeGraph {
    /// A ring of `n` tiles. Neighbors are the previous, next and opposite
    /// tile; the region is the two tiles on either side.
    pub fn ring(n: usize) -> Self {
        let neighbors = (0..n)
            .map(|i| [(i + n - 1) % n, (i + 1) % n, (i + n / 2) % n])
            .collect();
        let regions = (0..n)
            .map(|i| vec![(i + n - 2) % n, (i + n - 1) % n, (i + 1) % n, (i + 2) % n])
            .collect();
        Self {
            neighbors,
            regions,
            latitudes: vec![0.0; n],
        }
    }
}

impl TileGraph for FakeGraph {
    fn tile_count(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors(&self, tile: usize) -> [usize; 3] {
        self.neighbors[tile]
    }

    fn region(&self, tile: usize) -> &[usize] {
        &self.regions[tile]
    }

    fn coords(&self, tile: usize) -> [Vec3; 3] {
        let x = tile as f32 * 2.0;
        [
            Vec3::new(x, 0.0, 10.0),
            Vec3::new(x + 1.0, 0.0, 10.0),
            Vec3::new(x, 1.0, 10.0),
        ]
    }

    fn normal(&self, _tile: usize) -> Vec3 {
        Vec3::Z
    }

    fn latitude(&self, tile: usize) -> f32 {
        self.latitudes[tile]
    }
}

/// Loader handing out reference-counted tokens so tests can see when a model
/// has been released.
pub struct TokenLoader {
    pub token: std::rc::Rc<()>,
    pub loads: usize,
    pub broken: Vec<String>,
}

impl TokenLoader {
    pub fn new() -> Self {
        Self {
            token: std::rc::Rc::new(()),
            loads: 0,
            broken: Vec::new(),
        }
    }

    /// Models currently alive outside the loader.
    pub fn live(&self) -> usize {
        std::rc::Rc::strong_count(&self.token) - 1
    }
}

impl crate::assets::ModelLoader for TokenLoader {
    type Model = std::rc::Rc<()>;

    fn load(&mut self, path: &str) -> Result<Self::Model, crate::error::AssetError> {
        if self.broken.iter().any(|b| b == path) {
            return Err(crate::error::AssetError::NotFound(path.into()));
        }
        self.loads += 1;
        Ok(std::rc::Rc::clone(&self.token))
    }
}
