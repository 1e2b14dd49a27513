//! Declarative object descriptions.
//!
//! A prototype lists the capabilities an object starts with. Scenario files
//! and tests build objects from these instead of attaching components one by
//! one.

use depot_utils::EntityId;
use serde::Deserialize;

use crate::components::{
    Body, Category, Damageable, Hands, Item, Label, Physics, Tags, ThrownItem, Transform, Volume,
};
use crate::registry::ObjectRegistry;

/// Initial capabilities of a new object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntityPrototype {
    /// Default display name.
    pub name: String,
    /// Position and anchoring.
    pub transform: Option<Transform>,
    /// Portable.
    pub item: bool,
    /// Physics body.
    pub physics: Option<Physics>,
    /// Mob body.
    pub body: bool,
    /// Hands.
    pub hands: Option<Hands>,
    /// Currently thrown.
    pub thrown: bool,
    /// Smart fridge category.
    pub category: Option<Category>,
    /// Display name override.
    pub label: Option<Label>,
    /// Solution compartments.
    pub volume: Option<Volume>,
    /// Damage tracking.
    pub damageable: Option<Damageable>,
    /// Whitelist/blacklist tags.
    pub tags: Option<Tags>,
}

impl EntityPrototype {
    /// Creates a prototype with just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ObjectRegistry {
    /// Spawns an object with every capability listed in `prototype`.
    pub fn spawn_prototype(&mut self, prototype: &EntityPrototype) -> EntityId {
        let id = self.spawn(prototype.name.clone());
        if let Some(transform) = prototype.transform {
            self.insert(id, transform);
        }
        if prototype.item {
            self.insert(id, Item);
        }
        if let Some(physics) = prototype.physics {
            self.insert(id, physics);
        }
        if prototype.body {
            self.insert(id, Body);
        }
        if let Some(hands) = &prototype.hands {
            self.insert(id, hands.clone());
        }
        if prototype.thrown {
            self.insert(id, ThrownItem);
        }
        if let Some(category) = &prototype.category {
            self.insert(id, category.clone());
        }
        if let Some(label) = &prototype.label {
            self.insert(id, label.clone());
        }
        if let Some(volume) = &prototype.volume {
            self.insert(id, volume.clone());
        }
        if let Some(damageable) = prototype.damageable {
            self.insert(id, damageable);
        }
        if let Some(tags) = &prototype.tags {
            self.insert(id, tags.clone());
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_utils::FixedPoint2;

    #[test]
    fn test_spawn_from_json5() {
        let prototype: EntityPrototype = serde_json5::from_str(
            r#"{
                name: "Cola",
                item: true,
                category: "drinks",
                volume: { compartments: [30] },
            }"#,
        )
        .expect("valid prototype");

        let mut registry = ObjectRegistry::new();
        let cola = registry.spawn_prototype(&prototype);

        assert!(registry.has::<Item>(cola));
        assert!(!registry.has::<Body>(cola));
        assert_eq!(
            registry.get::<Volume>(cola).map(Volume::total),
            Some(FixedPoint2::new(30))
        );
        assert_eq!(
            registry.get::<Category>(cola),
            Some(&Category("drinks".to_string()))
        );
    }
}
