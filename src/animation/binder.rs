use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::Rig;

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` against the parts of `rig`.
    ///
    /// Tracks naming a part the rig does not have, or carrying keyframes of
    /// the wrong type for their property, produce no binding and are
    /// therefore never sampled.
    #[must_use]
    pub fn bind(rig: &Rig, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let part_name = &track.meta.part_name;
            let target = track.meta.target;

            if !track.is_compatible() {
                log::warn!(
                    "Clip {:?}: track {part_name}.{target} carries {:?} keys, skipping",
                    clip.name,
                    track.data.kind()
                );
                continue;
            }

            match rig.find(part_name) {
                Some(part) => bindings.push(PropertyBinding {
                    track_index,
                    part,
                    target,
                }),
                None => log::trace!(
                    "Clip {:?}: no part named {part_name:?} on this rig",
                    clip.name
                ),
            }
        }

        bindings
    }
}
