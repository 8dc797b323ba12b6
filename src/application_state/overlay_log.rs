//! # Logging Overlay Renderer
//!
//! An `OverlayRenderer` with no screen behind it. It tracks the live overlay set and
//! reports every change through the `log` facade.

use std::collections::HashMap;

use log::debug;

use crate::heatmap_state::overlay::{
    OverlayError, OverlayId, OverlayRenderer, OverlayShape, OverlayStyle,
};

/// Keeps the last style of every live overlay.
#[derive(Debug, Default)]
pub struct LogOverlayRenderer {
    live: HashMap<OverlayId, OverlayStyle>,
}

impl LogOverlayRenderer {
    /// Creates a renderer with no overlays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlays currently shown.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The style an overlay was last shown with.
    pub fn style(&self, id: &OverlayId) -> Option<&OverlayStyle> {
        self.live.get(id)
    }
}

impl OverlayRenderer for LogOverlayRenderer {
    fn show(
        &mut self,
        id: &OverlayId,
        shape: &OverlayShape,
        style: &OverlayStyle,
    ) -> Result<(), OverlayError> {
        debug!(
            "show {} in {} at {:?}: {} #{:06X} @ {:.2}",
            id,
            shape.dimension,
            shape.polygon[3],
            style.label,
            style.fill_color.to_hex(),
            style.fill_opacity
        );
        self.live.insert(id.clone(), style.clone());
        Ok(())
    }

    fn remove(&mut self, id: &OverlayId) -> Result<(), OverlayError> {
        match self.live.remove(id) {
            Some(_) => {
                debug!("remove {}", id);
                Ok(())
            }
            None => Err(OverlayError {
                id: id.clone(),
                reason: "not shown".to_string(),
            }),
        }
    }
}
