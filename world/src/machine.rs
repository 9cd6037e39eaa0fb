//! Recipe runtime attached to placed buildings.

use std::{collections::BTreeMap, time::Duration};

use gridforge_core::Recipe;

/// Item counts keyed by item name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    /// Adds `quantity` units of `item`.
    pub fn add(&mut self, item: &str, quantity: u32) {
        let entry = self.items.entry(item.to_owned()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Removes `quantity` units of `item` when enough are stored.
    pub fn remove(&mut self, item: &str, quantity: u32) -> bool {
        if !self.has(item, quantity) {
            return false;
        }
        if let Some(stored) = self.items.get_mut(item) {
            *stored -= quantity;
            if *stored == 0 {
                let _ = self.items.remove(item);
            }
        }
        true
    }

    /// Whether at least `quantity` units of `item` are stored.
    #[must_use]
    pub fn has(&self, item: &str, quantity: u32) -> bool {
        self.quantity(item) >= quantity
    }

    /// Stored units of `item`.
    #[must_use]
    pub fn quantity(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Iterates stored items in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(item, count)| (item.as_str(), *count))
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Accumulate-and-convert state machine driven by the frame clock.
///
/// The timer only runs while every input is present and resets to zero as
/// soon as an input goes missing; there is no partial credit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Machine {
    recipe_name: String,
    recipe: Recipe,
    inputs: Inventory,
    outputs: Inventory,
    elapsed: Duration,
}

impl Machine {
    /// Creates an idle machine running the provided recipe.
    #[must_use]
    pub fn new(recipe_name: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            recipe,
            inputs: Inventory::default(),
            outputs: Inventory::default(),
            elapsed: Duration::ZERO,
        }
    }

    /// Name of the recipe being run.
    #[must_use]
    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    /// Input store consumed by the recipe.
    #[must_use]
    pub fn inputs(&self) -> &Inventory {
        &self.inputs
    }

    /// Output store filled by the recipe.
    #[must_use]
    pub fn outputs(&self) -> &Inventory {
        &self.outputs
    }

    /// Time accumulated towards the current cycle.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Delivers items to the input store.
    pub fn stock(&mut self, item: &str, amount: u32) {
        self.inputs.add(item, amount);
    }

    /// Whether every recipe input is currently available.
    #[must_use]
    pub fn can_process(&self) -> bool {
        self.recipe
            .inputs
            .iter()
            .all(|(item, amount)| self.inputs.has(item, *amount))
    }

    /// Advances the machine by `dt`, returning `true` when a cycle completed.
    pub fn update(&mut self, dt: Duration) -> bool {
        if !self.can_process() {
            self.elapsed = Duration::ZERO;
            return false;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.recipe.process_time {
            return false;
        }

        for (item, amount) in &self.recipe.inputs {
            let _ = self.inputs.remove(item, *amount);
        }
        for (item, amount) in &self.recipe.outputs {
            self.outputs.add(item, *amount);
        }
        self.elapsed = Duration::ZERO;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smelting() -> Recipe {
        Recipe {
            inputs: BTreeMap::from([("iron_ore".to_owned(), 2), ("coal".to_owned(), 1)]),
            outputs: BTreeMap::from([("iron_plate".to_owned(), 1)]),
            process_time: Duration::from_millis(1_000),
        }
    }

    #[test]
    fn inventory_removal_requires_full_quantity() {
        let mut inventory = Inventory::default();
        inventory.add("coal", 2);
        assert!(!inventory.remove("coal", 3));
        assert!(inventory.remove("coal", 2));
        assert!(inventory.is_empty());
    }

    #[test]
    fn completes_once_after_process_time() {
        let mut machine = Machine::new("Smelter", smelting());
        machine.stock("iron_ore", 2);
        machine.stock("coal", 1);

        assert!(!machine.update(Duration::from_millis(600)));
        assert!(machine.update(Duration::from_millis(400)));
        assert_eq!(machine.outputs().quantity("iron_plate"), 1);
        assert!(machine.inputs().is_empty());
        assert_eq!(machine.elapsed(), Duration::ZERO);

        assert!(!machine.update(Duration::from_millis(2_000)));
        assert_eq!(machine.outputs().quantity("iron_plate"), 1);
    }

    #[test]
    fn missing_inputs_reset_the_timer() {
        let mut machine = Machine::new("Smelter", smelting());
        machine.stock("iron_ore", 2);
        assert!(!machine.update(Duration::from_millis(900)));
        assert_eq!(machine.elapsed(), Duration::ZERO);

        machine.stock("coal", 1);
        assert!(!machine.update(Duration::from_millis(900)));
        assert_eq!(machine.elapsed(), Duration::from_millis(900));
    }

    #[test]
    fn recipes_without_inputs_run_freely() {
        let mut machine = Machine::new(
            "Drill",
            Recipe {
                inputs: BTreeMap::new(),
                outputs: BTreeMap::from([("iron_ore".to_owned(), 1)]),
                process_time: Duration::from_millis(500),
            },
        );
        assert!(machine.update(Duration::from_millis(500)));
        assert!(machine.update(Duration::from_millis(500)));
        assert_eq!(machine.outputs().quantity("iron_ore"), 2);
    }
}
