//! Rigid multi-component layouts and their geometric transforms.

use serde::{Deserialize, Serialize};

use crate::GridPoint;

/// One component of a blueprint, positioned relative to the blueprint origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlueprintPart {
    /// Catalog name of the component.
    #[serde(rename = "type")]
    pub component: String,
    /// Position relative to the blueprint origin.
    #[serde(rename = "pos")]
    pub offset: GridPoint,
}

impl BlueprintPart {
    /// Creates a new blueprint part.
    #[must_use]
    pub fn new(component: impl Into<String>, offset: GridPoint) -> Self {
        Self {
            component: component.into(),
            offset,
        }
    }
}

/// Saved arrangement of components placeable as a single unit.
///
/// Serialises to `{ "name": ..., "components": [{ "type": ..., "pos": [x, y] }] }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blueprint {
    name: String,
    #[serde(rename = "components", default)]
    parts: Vec<BlueprintPart>,
}

impl Blueprint {
    /// Creates a blueprint from an ordered list of parts.
    #[must_use]
    pub fn new(name: impl Into<String>, parts: Vec<BlueprintPart>) -> Self {
        Self {
            name: name.into(),
            parts,
        }
    }

    /// Display name of the blueprint.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the display name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Ordered parts composing the blueprint.
    #[must_use]
    pub fn parts(&self) -> &[BlueprintPart] {
        &self.parts
    }

    /// Whether the blueprint has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Smallest and largest part offsets, or `None` for an empty blueprint.
    #[must_use]
    pub fn bounds(&self) -> Option<(GridPoint, GridPoint)> {
        let first = self.parts.first()?.offset;
        let (min, max) = self
            .parts
            .iter()
            .fold((first, first), |(min, max), part| {
                (
                    GridPoint::new(min.x().min(part.offset.x()), min.y().min(part.offset.y())),
                    GridPoint::new(max.x().max(part.offset.x()), max.y().max(part.offset.y())),
                )
            });
        Some((min, max))
    }

    /// Rotates the layout by 90° within its bounding box: `(x, y) -> (max_y - y, x)`.
    pub fn rotate_90(&mut self) {
        let Some((_, max)) = self.bounds() else {
            return;
        };
        for part in &mut self.parts {
            part.offset = GridPoint::new(max.y() - part.offset.y(), part.offset.x());
        }
    }

    /// Mirrors the layout across the vertical axis of its bounding box.
    pub fn flip_horizontal(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let span = min.x() + max.x();
        for part in &mut self.parts {
            part.offset = GridPoint::new(span - part.offset.x(), part.offset.y());
        }
    }

    /// Mirrors the layout across the horizontal axis of its bounding box.
    pub fn flip_vertical(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let span = min.y() + max.y();
        for part in &mut self.parts {
            part.offset = GridPoint::new(part.offset.x(), span - part.offset.y());
        }
    }

    /// Translates every part so that the first listed part sits at the origin.
    ///
    /// Other parts may end up at negative offsets; the bounding-box minimum is
    /// not forced to `(0, 0)`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(anchor) = self.parts.first().map(|part| part.offset) {
            for part in &mut self.parts {
                part.offset = part.offset.relative_to(anchor);
            }
        }
        self
    }
}
