use glam::Vec3;
use tracing::warn;

use crate::assets::ModelLoader;
use crate::error::GlobeError;
use crate::world::WorldState;

/// Model fade rate in alpha per second.
pub const MODEL_FADE: f32 = 1.0;

/// Distance over which models fade out at the edge of the visible range.
pub const MODEL_FADE_DIST: f32 = 4.0;

/// A decorative model placed on a tile.
#[derive(Debug, Clone)]
pub struct TileModel<M> {
    pub asset: M,
    /// Current alpha in `[0, 1]`.
    pub fade: f32,
    /// Whether the model should be fading in (true) or out (false).
    pub shown: bool,
    pub selected: bool,
    pub origin: Vec3,
    pub normal: Vec3,
    pub forward: Vec3,
}

/// Per-tile presentation state. None of it is part of the protocol.
#[derive(Debug, Clone)]
pub struct TileDisplay<M> {
    pub visible: bool,
    pub model: Option<TileModel<M>>,
}

impl<M> Default for TileDisplay<M> {
    fn default() -> Self {
        Self {
            visible: false,
            model: None,
        }
    }
}

impl<M> WorldState<M> {
    pub fn model(&self, tile: usize) -> Option<&TileModel<M>> {
        self.display.get(tile).and_then(|d| d.model.as_ref())
    }

    pub fn is_visible(&self, tile: usize) -> bool {
        self.display.get(tile).is_some_and(|d| d.visible)
    }

    pub fn set_visible(&mut self, tile: usize, visible: bool) -> Result<(), GlobeError> {
        self.check_tile(tile)?;
        self.display[tile].visible = visible;
        Ok(())
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for display in &mut self.display {
            display.visible = visible;
        }
    }

    /// Recompute which tiles face the camera. A tile is visible when its
    /// centroid projects onto the camera axis below
    /// `draw_distance - globe_radius`.
    pub fn update_visibility(&mut self, camera_forward: Vec3, draw_distance: f32, globe_radius: f32) {
        self.camera_forward = camera_forward;
        self.visible_range = draw_distance - globe_radius;
        for (tile, display) in self.tiles.iter().zip(&mut self.display) {
            display.visible = camera_forward.dot(tile.origin) < self.visible_range;
        }
    }

    /// Alpha multiplier fading a tile's model out over the last
    /// [`MODEL_FADE_DIST`] units of the visible range.
    pub fn model_fade_modulation(&self, tile: usize) -> f32 {
        let Some(model) = self.model(tile) else {
            return 0.0;
        };
        let dist = self.camera_forward.dot(model.origin);
        if dist < self.visible_range - MODEL_FADE_DIST {
            return 1.0;
        }
        if dist > self.visible_range {
            return 0.0;
        }
        (self.visible_range - dist) / MODEL_FADE_DIST
    }

    /// Attach a model to `tile`, or fade the current one out when `path` is
    /// empty.
    ///
    /// The new model is loaded before anything is touched, so a failed load
    /// leaves the tile showing whatever it showed before.
    pub fn set_tile_model<L>(&mut self, tile: usize, path: &str, loader: &mut L) -> Result<(), GlobeError>
    where
        L: ModelLoader<Model = M>,
    {
        self.check_tile(tile)?;

        if path.is_empty() {
            self.hide_model(tile);
            return Ok(());
        }

        let asset = loader
            .load(path)
            .map_err(|source| GlobeError::AssetLoad { tile, source })?;
        let placed = &self.tiles[tile];
        self.display[tile].model = Some(TileModel {
            asset,
            fade: 0.0,
            shown: true,
            selected: self.selection.tile() == Some(tile),
            origin: placed.origin,
            normal: placed.normal,
            forward: placed.forward,
        });
        Ok(())
    }

    /// Start fading out the tile's model, if it has one.
    pub fn hide_model(&mut self, tile: usize) {
        if let Some(model) = self.display.get_mut(tile).and_then(|d| d.model.as_mut()) {
            model.shown = false;
        }
    }

    /// Put the model at `path` on every land tile. After the first failure
    /// the remaining land tiles are cleared instead. Returns the number of
    /// tiles that received the model.
    pub fn apply_test_model<L>(&mut self, path: &str, loader: &mut L) -> usize
    where
        L: ModelLoader<Model = M>,
    {
        let mut failed = false;
        let mut placed = 0;
        for tile in 0..self.tiles.len() {
            if !self.tiles[tile].is_land() {
                continue;
            }
            if failed {
                self.hide_model(tile);
                continue;
            }
            match self.set_tile_model(tile, path, loader) {
                Ok(()) => placed += 1,
                Err(e) => {
                    warn!(error = %e, "Test model failed, clearing remaining tiles");
                    failed = true;
                }
            }
        }
        placed
    }

    /// Step a tile's model fade by `elapsed` seconds. Shown models fade in
    /// up to 1; hidden ones fade out and are dropped once the fade reaches
    /// zero. Returns the model's fade afterwards, if it still exists.
    pub fn advance_fade(&mut self, tile: usize, elapsed: f32) -> Option<f32> {
        let display = self.display.get_mut(tile)?;
        let model = display.model.as_mut()?;
        if model.shown {
            model.fade = (model.fade + MODEL_FADE * elapsed).min(1.0);
        } else {
            model.fade -= MODEL_FADE * elapsed;
            if model.fade <= 0.0 {
                display.model = None;
                return None;
            }
        }
        Some(model.fade)
    }

    pub fn advance_all_fades(&mut self, elapsed: f32) {
        for tile in 0..self.display.len() {
            self.advance_fade(tile, elapsed);
        }
    }
}
