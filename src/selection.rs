//! Which platforms the user has picked, plus the tile fill colour.
//!
//! The store is plain mutable state. An export never reads it directly: it
//! takes a [`SelectionSnapshot`] first, an owned copy that later toggles cannot
//! reach. Callers that share one store between threads wrap it in
//! `Arc<RwLock<SelectionStore>>` and hold the read lock only for `snapshot()`.

use crate::color::FillColor;
use crate::presets::{IconSpec, Preset, catalog};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown platform '{0}' (expected one of: {1})")]
    UnknownPlatform(String, String),
}

/// One selected output, tagged with the platform it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSpec {
    pub platform: &'static str,
    pub spec: IconSpec,
}

/// Immutable view of the selection taken at the start of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Selected specs in catalog order, presets flattened.
    pub specs: Vec<SelectedSpec>,
    pub fill_color: FillColor,
}

impl SelectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SelectionStore {
    presets: Vec<Preset>,
    fill_color: FillColor,
    initial_fill: FillColor,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    /// Every preset chosen, white fill.
    pub fn new() -> Self {
        Self::with_fill_color(FillColor::default())
    }

    /// Catalog defaults with a different starting fill colour (e.g. from config).
    pub fn with_fill_color(fill_color: FillColor) -> Self {
        Self {
            presets: catalog().to_vec(),
            fill_color,
            initial_fill: fill_color,
        }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn fill_color(&self) -> FillColor {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: FillColor) {
        self.fill_color = color;
    }

    pub fn is_chosen(&self, name: &str) -> Result<bool, SelectionError> {
        self.preset_index(name).map(|i| self.presets[i].chosen)
    }

    /// Flip one platform. Returns the new state.
    pub fn toggle(&mut self, name: &str) -> Result<bool, SelectionError> {
        let i = self.preset_index(name)?;
        self.presets[i].chosen = !self.presets[i].chosen;
        Ok(self.presets[i].chosen)
    }

    pub fn set_chosen(&mut self, name: &str, chosen: bool) -> Result<(), SelectionError> {
        let i = self.preset_index(name)?;
        self.presets[i].chosen = chosen;
        Ok(())
    }

    /// Choose exactly the named platforms, deselecting the rest.
    ///
    /// Validates every name before touching state, so a typo leaves the
    /// selection as it was.
    pub fn select_only<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), SelectionError> {
        let indices = names
            .iter()
            .map(|n| self.preset_index(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, preset) in self.presets.iter_mut().enumerate() {
            preset.chosen = indices.contains(&i);
        }
        Ok(())
    }

    /// Back to the catalog's initial choices and the initial fill colour.
    pub fn reset(&mut self) {
        self.presets = catalog().to_vec();
        self.fill_color = self.initial_fill;
    }

    pub fn chosen_presets(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter().filter(|p| p.chosen)
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let specs = self
            .chosen_presets()
            .flat_map(|preset| {
                preset.value.iter().map(move |spec| SelectedSpec {
                    platform: preset.name,
                    spec: spec.clone(),
                })
            })
            .collect();
        SelectionSnapshot {
            specs,
            fill_color: self.fill_color,
        }
    }

    fn preset_index(&self, name: &str) -> Result<usize, SelectionError> {
        self.presets
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let known: Vec<&str> = self.presets.iter().map(|p| p.name).collect();
                SelectionError::UnknownPlatform(name.to_string(), known.join(", "))
            })
    }
}
