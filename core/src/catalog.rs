//! Static component and recipe definitions loaded once at startup.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use crate::{Footprint, Rgb, Terrain, TileClass};

/// Color applied to components that are referenced but not defined.
const FALLBACK_COMPONENT_COLOR: Rgb = Rgb::new(100, 100, 100);

/// Template describing a single placeable component.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentSpec {
    name: String,
    color: Rgb,
    footprint: Footprint,
    accepted_classes: BTreeSet<TileClass>,
    accepted_subtypes: BTreeSet<String>,
}

impl ComponentSpec {
    /// Creates an unconstrained component.
    #[must_use]
    pub fn new(name: impl Into<String>, color: Rgb, footprint: Footprint) -> Self {
        Self {
            name: name.into(),
            color,
            footprint,
            accepted_classes: BTreeSet::new(),
            accepted_subtypes: BTreeSet::new(),
        }
    }

    /// Restricts the component to the provided tile classes. Empty means any class.
    #[must_use]
    pub fn with_accepted_classes(mut self, classes: impl IntoIterator<Item = TileClass>) -> Self {
        self.accepted_classes = classes.into_iter().collect();
        self
    }

    /// Restricts the component to the provided resource subtypes. Empty means any subtype.
    #[must_use]
    pub fn with_accepted_subtypes<S>(mut self, subtypes: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.accepted_subtypes = subtypes.into_iter().map(Into::into).collect();
        self
    }

    /// Fallback used for blueprint parts naming an unknown component.
    #[must_use]
    pub fn fallback(name: impl Into<String>) -> Self {
        Self::new(name, FALLBACK_COMPONENT_COLOR, Footprint::UNIT)
    }

    /// Catalog name of the component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill color of placed instances.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Size of the component in tiles.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Accepted tile classes; empty means unconstrained.
    #[must_use]
    pub fn accepted_classes(&self) -> &BTreeSet<TileClass> {
        &self.accepted_classes
    }

    /// Accepted resource subtypes; empty means unconstrained.
    #[must_use]
    pub fn accepted_subtypes(&self) -> &BTreeSet<String> {
        &self.accepted_subtypes
    }

    /// Whether the component may sit on the provided terrain.
    #[must_use]
    pub fn accepts(&self, terrain: &Terrain) -> bool {
        if !self.accepted_classes.is_empty() && !self.accepted_classes.contains(&terrain.class()) {
            return false;
        }

        if self.accepted_subtypes.is_empty() {
            return true;
        }

        terrain
            .subtype()
            .is_some_and(|subtype| self.accepted_subtypes.contains(subtype))
    }
}

/// Static conversion rule run by a building.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Recipe {
    /// Items consumed per cycle.
    pub inputs: BTreeMap<String, u32>,
    /// Items produced per cycle.
    pub outputs: BTreeMap<String, u32>,
    /// Time a cycle takes once its inputs are present.
    pub process_time: Duration,
}

/// Read-only component and recipe tables shared by every grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    components: BTreeMap<String, ComponentSpec>,
    recipes: BTreeMap<String, Recipe>,
}

impl Catalog {
    /// Creates a catalog from component specs and named recipes.
    #[must_use]
    pub fn new(
        components: impl IntoIterator<Item = ComponentSpec>,
        recipes: impl IntoIterator<Item = (String, Recipe)>,
    ) -> Self {
        Self {
            components: components
                .into_iter()
                .map(|spec| (spec.name().to_owned(), spec))
                .collect(),
            recipes: recipes.into_iter().collect(),
        }
    }

    /// Looks up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.get(name)
    }

    /// Looks up a component by name, falling back to a grey unconstrained 1×1 spec.
    #[must_use]
    pub fn component_or_fallback(&self, name: &str) -> Cow<'_, ComponentSpec> {
        self.components
            .get(name)
            .map_or_else(|| Cow::Owned(ComponentSpec::fallback(name)), Cow::Borrowed)
    }

    /// Iterates components in name order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.values()
    }

    /// Looks up the recipe run by buildings with the provided name.
    #[must_use]
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    /// Number of recipes in the catalog.
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}
