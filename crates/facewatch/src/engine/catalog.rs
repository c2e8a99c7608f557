//! Detector model catalog.

use facewatch_protocol::ModelId;
use serde::Serialize;

/// One detector variant the engine can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// Display name.
    pub name: String,
    /// Asset path without extension; `.param` and `.bin` are appended.
    pub asset_stem: String,
    /// Input resolution the detector resizes frames to.
    pub target_size: u32,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, asset_stem: impl Into<String>, target_size: u32) -> Self {
        Self {
            name: name.into(),
            asset_stem: asset_stem.into(),
            target_size,
        }
    }

    /// Network definition asset.
    pub fn param_asset(&self) -> String {
        format!("{}.param", self.asset_stem)
    }

    /// Weights asset.
    pub fn weights_asset(&self) -> String {
        format!("{}.bin", self.asset_stem)
    }
}

/// Index-addressed list of models, matching the selection control's order.
#[derive(Debug, Clone, Serialize)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    pub fn get(&self, id: ModelId) -> Option<&ModelSpec> {
        self.models.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &ModelSpec)> {
        self.models
            .iter()
            .enumerate()
            .map(|(idx, spec)| (ModelId(idx), spec))
    }
}

impl Default for ModelCatalog {
    /// Three BlazeFace variants sharing one weight file at different input sizes.
    fn default() -> Self {
        Self::new(vec![
            ModelSpec::new("blazeface-192", "Models/blazeface", 192),
            ModelSpec::new("blazeface-320", "Models/blazeface", 320),
            ModelSpec::new("blazeface-640", "Models/blazeface", 640),
        ])
    }
}
