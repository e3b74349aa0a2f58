// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable properties and property maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A style or transform channel a step can animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    /// Opacity (0..1)
    Opacity,
    /// Horizontal translation in pixels
    X,
    /// Vertical translation in pixels
    Y,
    /// Depth translation in pixels
    Z,
    /// Horizontal translation as a percentage of the element's width
    XPercent,
    /// Vertical translation as a percentage of the element's height
    YPercent,
    /// Uniform scale
    Scale,
    /// Rotation around the X axis in degrees
    RotateX,
    /// Rotation around the Y axis in degrees
    RotateY,
    /// First endpoint attribute of an SVG line
    Y1,
    /// Second endpoint attribute of an SVG line
    Y2,
}

impl Property {
    /// Value of the property when no inline style is set
    pub fn rest_value(self) -> f32 {
        match self {
            Self::Opacity | Self::Scale => 1.0,
            _ => 0.0,
        }
    }

    /// Style name as the tween library spells it
    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::XPercent => "xPercent",
            Self::YPercent => "yPercent",
            Self::Scale => "scale",
            Self::RotateX => "rotateX",
            Self::RotateY => "rotateY",
            Self::Y1 => "y1",
            Self::Y2 => "y2",
        }
    }
}

/// Ordered property -> value map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap(IndexMap<Property, f32>);

impl PropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.0.insert(property, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, property: Property, value: f32) {
        self.0.insert(property, value);
    }

    /// Get a value
    pub fn get(&self, property: Property) -> Option<f32> {
        self.0.get(&property).copied()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.0.iter().map(|(p, v)| (*p, *v))
    }

    /// Properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.0.keys().copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Property, f32)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (Property, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Linear interpolation between two floats
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
