use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::binding::TargetProperty;
use crate::animation::tracks::KeyframeTrack;
use crate::animation::values::{TrackValue, ValueKind};
use crate::errors::{AnimationError, Result};

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub part_name: String,
    pub target: TargetProperty,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Scalar(KeyframeTrack<f32>),
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            TrackData::Scalar(_) => ValueKind::Scalar,
            TrackData::Vector3(_) => ValueKind::Vector3,
            TrackData::Quaternion(_) => ValueKind::Quaternion,
        }
    }

    #[must_use]
    pub fn end_time(&self) -> Option<f32> {
        match self {
            TrackData::Scalar(t) => t.end_time(),
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
        }
    }

    #[must_use]
    pub fn sample(&self, time: f32) -> Option<TrackValue> {
        match self {
            TrackData::Scalar(t) => t.sample(time).map(TrackValue::Scalar),
            TrackData::Vector3(t) => t.sample(time).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t.sample(time).map(TrackValue::Quaternion),
        }
    }
}

/// Full track definition: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn new(part_name: impl Into<String>, target: TargetProperty, data: TrackData) -> Self {
        Self {
            meta: TrackMeta {
                part_name: part_name.into(),
                target,
            },
            data,
        }
    }

    /// Builds a track from an authored property path such as `"position.z"`.
    pub fn from_path(part_name: impl Into<String>, path: &str, data: TrackData) -> Result<Self> {
        let target: TargetProperty = path.parse()?;
        Ok(Self::new(part_name, target, data))
    }

    /// Whether the keyframe type matches what the target property expects.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.data.kind() == self.meta.target.value_kind()
    }
}

/// What a clip does once its local time reaches the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopPolicy {
    /// Play to the end, hold the last frame and signal completion.
    Once,
    /// Wrap back to the start forever.
    #[default]
    Repeat,
}

/// A named, fixed-duration bundle of tracks. Immutable once built and shared
/// between every entity that plays it.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
    pub loop_policy: LoopPolicy,
}

impl AnimationClip {
    /// Creates a repeating clip whose duration is the last keyframe time.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .filter_map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
            loop_policy: LoopPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_loop_policy(mut self, loop_policy: LoopPolicy) -> Self {
        self.loop_policy = loop_policy;
        self
    }

    /// Rejects clips that cannot be played meaningfully.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(AnimationError::InvalidClip {
                name: self.name.clone(),
                reason: format!("duration {} is not a finite, non-negative number", self.duration),
            });
        }
        if let Some(track) = self.tracks.iter().find(|t| !t.is_compatible()) {
            return Err(AnimationError::InvalidClip {
                name: self.name.clone(),
                reason: format!(
                    "track for {}.{} carries {:?} keys",
                    track.meta.part_name,
                    track.meta.target,
                    track.data.kind()
                ),
            });
        }
        Ok(())
    }
}

/// The clips available to one entity, keyed by unique name.
#[derive(Debug, Clone, Default)]
pub struct ClipSet {
    clips: FxHashMap<String, Arc<AnimationClip>>,
}

impl ClipSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clips(clips: impl IntoIterator<Item = AnimationClip>) -> Result<Self> {
        let mut set = Self::new();
        for clip in clips {
            set.insert(clip)?;
        }
        Ok(set)
    }

    /// Validates and adds a clip. Names must be unique within the set.
    pub fn insert(&mut self, clip: AnimationClip) -> Result<Arc<AnimationClip>> {
        clip.validate()?;
        if self.clips.contains_key(&clip.name) {
            return Err(AnimationError::DuplicateClip(clip.name));
        }
        let clip = Arc::new(clip);
        self.clips.insert(clip.name.clone(), Arc::clone(&clip));
        Ok(clip)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
