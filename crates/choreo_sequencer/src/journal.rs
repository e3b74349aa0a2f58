// SPDX-License-Identifier: MIT OR Apache-2.0
//! Record of inline styles touched by animations, so they can be restored.

use crate::property::Property;
use crate::scene::{Scene, TargetId};
use indexmap::IndexMap;

/// Remembers the original inline value of every (element, property) written
/// through it. [`StyleJournal::revert`] puts them all back.
#[derive(Debug, Default)]
pub struct StyleJournal {
    originals: IndexMap<(TargetId, Property), Option<f32>>,
}

impl StyleJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value, remembering the original the first time.
    /// Returns false if the element is gone.
    pub fn write(&mut self, scene: &mut Scene, target: TargetId, property: Property, value: f32) -> bool {
        if !scene.is_mounted(target) {
            return false;
        }
        self.originals
            .entry((target, property))
            .or_insert_with(|| scene.inline(target, property));
        scene.set(target, property, value)
    }

    /// Restore every original value, newest first, and forget them
    pub fn revert(&mut self, scene: &mut Scene) {
        for ((target, property), original) in self.originals.drain(..).rev() {
            match original {
                Some(value) => {
                    scene.set(target, property, value);
                }
                None => scene.clear(target, property),
            }
        }
    }

    /// Number of channels recorded
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Whether nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_restores_inline_and_absent_values() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        scene.set(a, Property::Opacity, 0.3);

        let mut journal = StyleJournal::new();
        journal.write(&mut scene, a, Property::Opacity, 0.9);
        journal.write(&mut scene, a, Property::Opacity, 0.5);
        journal.write(&mut scene, a, Property::Y, 40.0);
        assert_eq!(journal.len(), 2);

        journal.revert(&mut scene);
        assert_eq!(scene.inline(a, Property::Opacity), Some(0.3));
        assert_eq!(scene.inline(a, Property::Y), None);
        assert!(journal.is_empty());
    }

    #[test]
    fn writes_to_missing_elements_are_dropped() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        scene.unmount(a);
        let mut journal = StyleJournal::new();
        assert!(!journal.write(&mut scene, a, Property::X, 1.0));
        assert!(journal.is_empty());
    }
}
