// SPDX-License-Identifier: MIT OR Apache-2.0
//! Element store that animations write into.
//!
//! Elements are registered once by name and then addressed through typed
//! [`TargetId`] handles. Writes to an unmounted element are dropped.

use crate::property::Property;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle to an element in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// A single animatable element
#[derive(Debug, Clone)]
pub struct Element {
    /// Registered name
    pub name: String,
    /// Whether the element is attached to the page
    pub mounted: bool,
    style: IndexMap<Property, f32>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            mounted: true,
            style: IndexMap::new(),
        }
    }

    /// Inline style values currently set on the element
    pub fn inline_style(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.style.iter().map(|(p, v)| (*p, *v))
    }
}

/// Arena of named elements
#[derive(Debug, Default)]
pub struct Scene {
    elements: Vec<Element>,
    names: IndexMap<String, TargetId>,
}

/// Scene shared between the orchestrator and its sequencers
pub type SharedScene = Arc<Mutex<Scene>>;

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle
    pub fn shared(self) -> SharedScene {
        Arc::new(Mutex::new(self))
    }

    /// Register an element, or remount and return the existing one
    pub fn insert(&mut self, name: impl Into<String>) -> TargetId {
        let name = name.into();
        if let Some(id) = self.names.get(&name).copied() {
            if let Some(element) = self.elements.get_mut(id.0 as usize) {
                element.mounted = true;
            }
            return id;
        }

        let id = TargetId(self.elements.len() as u32);
        self.elements.push(Element::new(name.clone()));
        self.names.insert(name, id);
        id
    }

    /// Register `count` elements named `prefix-0`, `prefix-1`, ...
    pub fn insert_group(&mut self, prefix: &str, count: usize) -> Vec<TargetId> {
        (0..count)
            .map(|i| self.insert(format!("{prefix}-{i}")))
            .collect()
    }

    /// Find a mounted element by name
    pub fn lookup(&self, name: &str) -> Option<TargetId> {
        self.names
            .get(name)
            .copied()
            .filter(|id| self.is_mounted(*id))
    }

    /// Name of an element
    pub fn name(&self, id: TargetId) -> Option<&str> {
        self.elements.get(id.0 as usize).map(|e| e.name.as_str())
    }

    /// Element by handle
    pub fn element(&self, id: TargetId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    /// Mounted elements in registration order
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Element)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.mounted)
            .map(|(i, e)| (TargetId(i as u32), e))
    }

    /// Whether the element exists and is attached
    pub fn is_mounted(&self, id: TargetId) -> bool {
        self.elements
            .get(id.0 as usize)
            .is_some_and(|e| e.mounted)
    }

    /// Detach an element. Its handle stays valid but writes are ignored.
    pub fn unmount(&mut self, id: TargetId) {
        if let Some(element) = self.elements.get_mut(id.0 as usize) {
            element.mounted = false;
            element.style.clear();
        }
    }

    /// Current value of a property: inline style, else the rest value.
    /// `None` for unmounted elements.
    pub fn value(&self, id: TargetId, property: Property) -> Option<f32> {
        let element = self.elements.get(id.0 as usize).filter(|e| e.mounted)?;
        Some(
            element
                .style
                .get(&property)
                .copied()
                .unwrap_or_else(|| property.rest_value()),
        )
    }

    /// Inline style value, if one is set
    pub fn inline(&self, id: TargetId, property: Property) -> Option<f32> {
        self.elements
            .get(id.0 as usize)
            .and_then(|e| e.style.get(&property).copied())
    }

    /// Set an inline style value. Returns false if the element is gone.
    pub fn set(&mut self, id: TargetId, property: Property, value: f32) -> bool {
        match self.elements.get_mut(id.0 as usize) {
            Some(element) if element.mounted => {
                element.style.insert(property, value);
                true
            }
            _ => false,
        }
    }

    /// Remove an inline style value
    pub fn clear(&mut self, id: TargetId, property: Property) {
        if let Some(element) = self.elements.get_mut(id.0 as usize) {
            element.style.shift_remove(&property);
        }
    }

    /// Number of registered elements, mounted or not
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element was ever registered
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_per_name() {
        let mut scene = Scene::new();
        let a = scene.insert("logo");
        let b = scene.insert("logo");
        assert_eq!(a, b);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.lookup("logo"), Some(a));
    }

    #[test]
    fn values_fall_back_to_rest() {
        let mut scene = Scene::new();
        let id = scene.insert("card");
        assert_eq!(scene.value(id, Property::Opacity), Some(1.0));
        assert!(scene.set(id, Property::Opacity, 0.25));
        assert_eq!(scene.value(id, Property::Opacity), Some(0.25));
        scene.clear(id, Property::Opacity);
        assert_eq!(scene.inline(id, Property::Opacity), None);
    }

    #[test]
    fn unmounted_elements_ignore_writes() {
        let mut scene = Scene::new();
        let id = scene.insert("card");
        scene.unmount(id);
        assert!(!scene.set(id, Property::X, 10.0));
        assert_eq!(scene.value(id, Property::X), None);
        assert_eq!(scene.lookup("card"), None);
    }

    #[test]
    fn iter_skips_unmounted() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let b = scene.insert("b");
        scene.unmount(a);
        let names: Vec<&str> = scene.iter().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
        assert_eq!(scene.iter().next().map(|(id, _)| id), Some(b));
    }

    #[test]
    fn groups_are_numbered() {
        let mut scene = Scene::new();
        let cards = scene.insert_group("card", 3);
        assert_eq!(cards.len(), 3);
        assert_eq!(scene.name(cards[2]), Some("card-2"));
    }
}
