use std::sync::Arc;

use glam::{Quat, Vec3};
use myth_blend::animation::tracks::InterpolationMode;
use myth_blend::{
    AnimatedEntity, AnimationClip, AnimationEngine, BodyHandle, ClipSet, EngineConfig, EventBus,
    KeyframeTrack, LoopPolicy, PartTransform, PhysicsSnapshot, Rig, Track, TrackData, WorldEvent,
};

const DT: f32 = 1.0 / 20.0;

fn scalar(times: &[f32], values: &[f32]) -> TrackData {
    TrackData::Scalar(KeyframeTrack::new(times.to_vec(), values.to_vec(), InterpolationMode::Linear))
}

fn npc_clips() -> anyhow::Result<ClipSet> {
    let idle = AnimationClip::new(
        "Idle",
        vec![Track::from_path("body", "position.y", scalar(&[0.0, 1.0, 2.0], &[0.0, 0.05, 0.0]))?],
    );

    let swing = |angle: f32| Quat::from_rotation_x(angle);
    let run = AnimationClip::new(
        "Run",
        vec![
            Track::from_path("body", "position.y", scalar(&[0.0, 0.25, 0.5], &[0.0, 0.2, 0.0]))?,
            Track::from_path(
                "leg_l",
                "rotation",
                TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 0.25, 0.5],
                    vec![swing(0.6), swing(-0.6), swing(0.6)],
                    InterpolationMode::Linear,
                )),
            )?,
        ],
    );

    Ok(ClipSet::from_clips([idle, run])?)
}

fn door_clips() -> anyhow::Result<ClipSet> {
    let open = AnimationClip::new(
        "Open",
        vec![Track::from_path("panel", "rotation", TrackData::Quaternion(KeyframeTrack::new(
            vec![0.0, 0.8],
            vec![Quat::IDENTITY, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)],
            InterpolationMode::Linear,
        )))?],
    )
    .with_loop_policy(LoopPolicy::Once);

    Ok(ClipSet::from_clips([open])?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut bus = EventBus::new();
    let mut physics = PhysicsSnapshot::new();
    let mut engine = AnimationEngine::new(EngineConfig::default(), &mut bus);

    let mut rig = Rig::new();
    rig.add_part("body", PartTransform::new());
    rig.add_part("leg_l", PartTransform::from_position(Vec3::new(-0.2, -0.5, 0.0)));
    let npc = engine.spawn(AnimatedEntity::npc(rig, Arc::new(npc_clips()?)));
    physics.attach_body(BodyHandle(1), npc);

    let mut rig = Rig::new();
    rig.add_part("panel", PartTransform::new());
    let door = engine.spawn(AnimatedEntity::generic(rig, Arc::new(door_clips()?)));

    for frame in 0..60 {
        match frame {
            10 => physics.set_velocity(npc, Vec3::new(3.0, 0.0, 0.0)),
            20 => {
                bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(1) });
            }
            30 => {
                physics.set_velocity(npc, Vec3::ZERO);
                bus.publish(WorldEvent::AnimationTriggered {
                    entity: door,
                    clip: "Open".to_string(),
                });
            }
            _ => {}
        }

        for done in engine.update(DT, &physics) {
            println!("frame {frame:2}: {:?} finished {:?}", done.entity, done.clip);
        }

        let npc_state = engine.entity(npc).map(|e| {
            let y = e.rig().part_by_name("body").map_or(0.0, |p| p.transform.position.y);
            (e.active_clip_name().unwrap_or("-").to_string(), e.is_interrupt_locked(), y)
        });
        if let Some((clip, locked, y)) = npc_state {
            println!("frame {frame:2}: npc {clip:<5} locked={locked:<5} body.y={y:.3}");
        }
    }

    engine.dispose(&mut bus);
    println!("subscribers left: {}", bus.subscriber_count());

    Ok(())
}
