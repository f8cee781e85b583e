use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::scene::transform::PartTransform;

new_key_type! {
    /// Stable handle of a movable part inside a [`Rig`].
    pub struct PartKey;
}

/// A movable part of an entity.
///
/// `transform` is the live value written by the animation engine. `rest` is
/// the geometry default taken from asset data and never animated.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    pub transform: PartTransform,
    rest: PartTransform,
}

impl Part {
    #[must_use]
    pub fn new(name: impl Into<String>, rest: PartTransform) -> Self {
        Self {
            name: name.into(),
            transform: rest,
            rest,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn rest(&self) -> &PartTransform {
        &self.rest
    }

    pub fn reset_to_rest(&mut self) {
        self.transform = self.rest;
    }
}

/// The set of parts of one entity, addressable by key or by authored name.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    parts: SlotMap<PartKey, Part>,
    names: FxHashMap<String, PartKey>,
}

impl Rig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part whose current transform starts at its rest pose.
    ///
    /// Names are expected to be unique. A duplicate name shadows the earlier
    /// part for name lookups; both parts stay addressable by key.
    pub fn add_part(&mut self, name: impl Into<String>, rest: PartTransform) -> PartKey {
        let part = Part::new(name, rest);
        let name = part.name.clone();
        let key = self.parts.insert(part);
        if let Some(previous) = self.names.insert(name, key) {
            log::warn!(
                "Rig part name {:?} already in use by {previous:?}, shadowing it",
                self.parts[key].name
            );
        }
        key
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<PartKey> {
        self.names.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn part(&self, key: PartKey) -> Option<&Part> {
        self.parts.get(key)
    }

    #[inline]
    pub fn part_mut(&mut self, key: PartKey) -> Option<&mut Part> {
        self.parts.get_mut(key)
    }

    #[must_use]
    pub fn part_by_name(&self, name: &str) -> Option<&Part> {
        self.find(name).and_then(|key| self.parts.get(key))
    }

    #[must_use]
    pub fn transform(&self, key: PartKey) -> Option<&PartTransform> {
        self.parts.get(key).map(|p| &p.transform)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Resets the given parts to their rest transforms. Unknown keys are skipped.
    pub fn reset_to_rest(&mut self, keys: impl IntoIterator<Item = PartKey>) {
        for key in keys {
            if let Some(part) = self.parts.get_mut(key) {
                part.reset_to_rest();
            }
        }
    }
}
