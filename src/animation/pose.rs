//! Pose accumulation.
//!
//! Every playback that feeds an entity in a frame adds `weight * value` into a
//! [`Pose`]. Nothing touches the rig until [`Pose::commit`], so outgoing and
//! incoming clips of a crossfade combine before anything is written.
//!
//! Weight a property did not receive from any clip (a track present in only
//! one side of a crossfade) is filled from the part's rest transform, keeping
//! the total weight per property at exactly 1.

use glam::{Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::animation::binding::TargetProperty;
use crate::animation::values::TrackValue;
use crate::scene::{PartKey, Rig};

#[derive(Debug, Clone, Copy)]
enum Accum {
    Scalar(f32),
    Vector3(Vec3),
    // Summed as a 4-vector, renormalized on resolve
    Quaternion(Vec4),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    sum: Accum,
    weight: f32,
}

impl Entry {
    fn new(value: TrackValue, weight: f32) -> Self {
        let sum = match value {
            TrackValue::Scalar(v) => Accum::Scalar(v * weight),
            TrackValue::Vector3(v) => Accum::Vector3(v * weight),
            TrackValue::Quaternion(q) => Accum::Quaternion(Vec4::from(q) * weight),
        };
        Self { sum, weight }
    }

    fn add(&mut self, value: TrackValue, weight: f32) -> bool {
        match (&mut self.sum, value) {
            (Accum::Scalar(sum), TrackValue::Scalar(v)) => *sum += v * weight,
            (Accum::Vector3(sum), TrackValue::Vector3(v)) => *sum += v * weight,
            (Accum::Quaternion(sum), TrackValue::Quaternion(q)) => {
                *sum += hemisphere_aligned(*sum, q) * weight;
            }
            _ => return false,
        }
        self.weight += weight;
        true
    }

    /// Final value: normalized by total weight above 1, topped up with `rest`
    /// below 1.
    fn resolve(self, rest: TrackValue) -> TrackValue {
        let missing = (1.0 - self.weight).max(0.0);
        let norm = self.weight.max(1.0);

        match (self.sum, rest) {
            (Accum::Scalar(sum), TrackValue::Scalar(r)) => TrackValue::Scalar((sum + r * missing) / norm),
            (Accum::Vector3(sum), TrackValue::Vector3(r)) => {
                TrackValue::Vector3((sum + r * missing) / norm)
            }
            (Accum::Quaternion(sum), TrackValue::Quaternion(r)) => {
                let blended = sum + hemisphere_aligned(sum, r) * missing;
                if blended.length_squared() <= f32::EPSILON {
                    TrackValue::Quaternion(r)
                } else {
                    TrackValue::Quaternion(Quat::from_vec4(blended).normalize())
                }
            }
            // Kinds were checked when the entry was created
            (_, rest) => rest,
        }
    }
}

/// Flips `q` into the hemisphere of the running sum so that `q` and `-q`
/// (the same rotation) do not cancel out.
fn hemisphere_aligned(sum: Vec4, q: Quat) -> Vec4 {
    let v = Vec4::from(q);
    if sum.dot(v) < 0.0 { -v } else { v }
}

/// Pending weighted property values for one entity's parts.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    entries: FxHashMap<(PartKey, TargetProperty), Entry>,
}

impl Pose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight * value` to the pending value of `part.target`.
    ///
    /// Values whose kind does not fit the property are dropped.
    pub fn accumulate(&mut self, part: PartKey, target: TargetProperty, value: TrackValue, weight: f32) {
        if weight <= 0.0 || value.kind() != target.value_kind() {
            return;
        }

        match self.entries.get_mut(&(part, target)) {
            Some(entry) => {
                if !entry.add(value, weight) {
                    log::trace!("Pose: value kind mismatch on {part:?}.{target}");
                }
            }
            None => {
                self.entries.insert((part, target), Entry::new(value, weight));
            }
        }
    }

    /// Total weight accumulated so far for `part.target`.
    #[must_use]
    pub fn weight(&self, part: PartKey, target: TargetProperty) -> f32 {
        self.entries.get(&(part, target)).map_or(0.0, |e| e.weight)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes every pending value into `rig` and empties the buffer.
    ///
    /// Parts missing from the rig are skipped. Properties nobody contributed
    /// to this frame keep whatever value they already had.
    pub fn commit(&mut self, rig: &mut Rig) {
        for ((key, target), entry) in self.entries.drain() {
            let Some(part) = rig.part_mut(key) else {
                continue;
            };
            let rest = target.read(part.rest());
            let value = entry.resolve(rest);
            target.write(&mut part.transform, value);
        }
    }
}
