//! Engine & Event Gateway Tests
//!
//! Tests for:
//! - NPC locomotion driven by physics velocity
//! - Melee lunge: interrupt lock, one-shot completion, lock release
//! - Generic triggered clips and rest-pose reset
//! - force_trigger / release_interrupt_lock
//! - EventBus subscription lifecycle and disposal

use std::sync::Arc;

use glam::{Quat, Vec3};

use myth_blend::animation::clip::{AnimationClip, ClipSet, LoopPolicy, Track, TrackData};
use myth_blend::animation::gateway::EventGateway;
use myth_blend::animation::tracks::{InterpolationMode, KeyframeTrack};
use myth_blend::world::EventKind;
use myth_blend::{
    AnimatedEntity, AnimationEngine, AnimationError, BodyHandle, EngineConfig, EntityKey, EventBus,
    PartTransform, PhysicsSnapshot, Rig, TargetProperty, WorldEvent,
};

const EPSILON: f32 = 1e-5;
const DT_60HZ: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn hold_clip(name: &str, height: f32, duration: f32, policy: LoopPolicy) -> AnimationClip {
    let track = Track::new(
        "body",
        TargetProperty::PositionY,
        TrackData::Scalar(KeyframeTrack::new(
            vec![0.0, duration],
            vec![height, height],
            InterpolationMode::Linear,
        )),
    );
    AnimationClip::new(name, vec![track]).with_loop_policy(policy)
}

fn npc_clips() -> Arc<ClipSet> {
    Arc::new(
        ClipSet::from_clips([
            hold_clip("Idle", 0.0, 1.0, LoopPolicy::Repeat),
            hold_clip("Run", 1.0, 1.0, LoopPolicy::Repeat),
            hold_clip("Wave", 2.0, 0.5, LoopPolicy::Once),
        ])
        .unwrap(),
    )
}

fn npc() -> AnimatedEntity {
    let mut rig = Rig::new();
    rig.add_part("body", PartTransform::new());
    AnimatedEntity::npc(rig, npc_clips())
}

/// A door that slides from x = 0 to x = 2 and swings a quarter turn.
fn door() -> AnimatedEntity {
    let mut rig = Rig::new();
    rig.add_part("door", PartTransform::from_position(Vec3::new(0.5, 0.0, 0.0)));

    let open = AnimationClip::new(
        "Open",
        vec![
            Track::new(
                "door",
                TargetProperty::PositionX,
                TrackData::Scalar(KeyframeTrack::new(
                    vec![0.0, 1.0],
                    vec![0.0, 2.0],
                    InterpolationMode::Linear,
                )),
            ),
            Track::new(
                "door",
                TargetProperty::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 1.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)],
                    InterpolationMode::Linear,
                )),
            ),
        ],
    )
    .with_loop_policy(LoopPolicy::Once);

    let slam = AnimationClip::new(
        "Slam",
        vec![Track::new(
            "door",
            TargetProperty::PositionZ,
            TrackData::Scalar(KeyframeTrack::new(vec![0.0, 1.0], vec![0.0, -1.0], InterpolationMode::Linear)),
        )],
    )
    .with_loop_policy(LoopPolicy::Once);

    AnimatedEntity::generic(rig, Arc::new(ClipSet::from_clips([open, slam]).unwrap()))
}

struct World {
    bus: EventBus,
    physics: PhysicsSnapshot,
    engine: AnimationEngine,
}

impl World {
    fn new(config: EngineConfig) -> Self {
        let mut bus = EventBus::new();
        let engine = AnimationEngine::new(config, &mut bus);
        Self {
            bus,
            physics: PhysicsSnapshot::new(),
            engine,
        }
    }

    fn spawn_npc(&mut self, body: u64) -> EntityKey {
        let key = self.engine.spawn(npc());
        self.physics.attach_body(BodyHandle(body), key);
        key
    }

    fn update(&mut self, dt: f32) -> Vec<myth_blend::AnimationFinished> {
        self.engine.update(dt, &self.physics)
    }

    fn active(&self, key: EntityKey) -> Option<&str> {
        self.engine.entity(key).and_then(|e| e.active_clip_name())
    }

    fn door_position(&self, key: EntityKey) -> Vec3 {
        let rig = self.engine.entity(key).unwrap().rig();
        rig.part_by_name("door").unwrap().transform.position
    }
}

// ============================================================================
// NPC locomotion
// ============================================================================

#[test]
fn npc_follows_velocity() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);

    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));

    world.physics.set_velocity(npc, Vec3::new(2.0, 0.0, 0.0));
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Run"));
    assert!(world.engine.entity(npc).unwrap().context().crossfade().is_fading());

    world.update(0.1);
    let ctx = world.engine.entity(npc).unwrap().context();
    assert!(!ctx.crossfade().is_fading());
    assert!(approx(ctx.active().unwrap().weight, 1.0));

    let y = world.engine.entity(npc).unwrap().rig().part_by_name("body").unwrap().transform.position.y;
    assert!(approx(y, 1.0), "got {y}");
}

#[test]
fn run_fade_settles_at_60hz() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);
    world.update(DT_60HZ);

    world.physics.set_velocity(npc, Vec3::new(2.0, 0.0, 0.0));
    // 0.2s fade = 12 frames
    for _ in 0..12 {
        world.update(DT_60HZ);
    }

    let ctx = world.engine.entity(npc).unwrap().context();
    assert_eq!(ctx.active_clip_name(), Some("Run"));
    assert!(!ctx.crossfade().is_fading());
    assert!(approx(ctx.active().unwrap().weight, 1.0));
}

#[test]
fn run_threshold_comes_from_config() {
    let mut world = World::new(EngineConfig::default().with_run_speed_threshold_sq(4.0));
    let npc = world.spawn_npc(1);

    world.physics.set_velocity(npc, Vec3::new(1.5, 0.0, 0.0));
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));

    world.physics.set_velocity(npc, Vec3::new(3.0, 0.0, 0.0));
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Run"));
}

#[test]
fn slow_drift_stays_idle() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);

    // |v|^2 = 0.0025, below the 0.01 threshold
    world.physics.set_velocity(npc, Vec3::new(0.05, 0.0, 0.0));
    world.update(0.1);
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));
}

// ============================================================================
// Melee lunge
// ============================================================================

#[test]
fn melee_lunge_locks_then_returns_to_idle() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    assert_eq!(world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) }), 1);
    assert!(world.update(0.25).is_empty());

    {
        let entity = world.engine.entity(npc).unwrap();
        assert!(entity.is_interrupt_locked());
        let lunge = entity.context().active().unwrap();
        assert_eq!(lunge.clip_name(), "Run");
        assert!(approx(lunge.time_scale, 2.0));
        assert_eq!(lunge.loop_policy, LoopPolicy::Once);
        assert!(approx(lunge.local_time, 0.5));
    }

    let finished = world.update(0.25);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].entity, npc);
    assert_eq!(finished[0].clip, "Run");
    assert!(!world.engine.is_interrupt_locked(npc));

    // Standing still: the controller takes over again
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));
}

#[test]
fn melee_lunge_finishes_on_schedule_at_60hz() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(DT_60HZ);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });

    // 1.0s Run clip at time scale 2 = 30 frames
    let mut finished_on = None;
    for frame in 1..=30 {
        if !world.update(DT_60HZ).is_empty() {
            finished_on = Some(frame);
        }
    }

    assert_eq!(finished_on, Some(30));
    assert!(!world.engine.is_interrupt_locked(npc));
}

#[test]
fn lunge_settings_come_from_config() {
    let config = EngineConfig::default()
        .with_lunge_fade_duration(0.0)
        .with_lunge_time_scale(4.0);
    let mut world = World::new(config);
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    assert!(world.update(0.125).is_empty());

    {
        let ctx = world.engine.entity(npc).unwrap().context();
        assert!(!ctx.crossfade().is_fading());
        let lunge = ctx.active().unwrap();
        assert!(approx(lunge.time_scale, 4.0));
        assert!(approx(lunge.local_time, 0.5));
    }

    assert_eq!(world.update(0.125).len(), 1);
    assert!(!world.engine.is_interrupt_locked(npc));
}

#[test]
fn melee_while_locked_is_ignored() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    world.update(0.1);
    let lunge = world.engine.entity(npc).unwrap().context().active().unwrap().id();

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    world.update(0.1);
    let still = world.engine.entity(npc).unwrap().context().active().unwrap().id();
    assert_eq!(lunge, still);
}

#[test]
fn velocity_does_not_interrupt_lunge() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    world.update(0.1);
    let lunge = world.engine.entity(npc).unwrap().context().active().unwrap().id();

    world.physics.set_velocity(npc, Vec3::ZERO);
    world.update(0.1);
    let ctx = world.engine.entity(npc).unwrap().context();
    assert_eq!(ctx.active().unwrap().id(), lunge);
    assert!(ctx.is_interrupt_locked());
}

#[test]
fn melee_from_unknown_body_is_ignored() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(99) });
    world.update(0.1);
    assert!(!world.engine.is_interrupt_locked(npc));
    assert_eq!(world.active(npc), Some("Idle"));
}

#[test]
fn melee_from_removed_entity_body_is_ignored() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.physics.remove_entity(npc);
    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    world.update(0.1);
    assert!(!world.engine.is_interrupt_locked(npc));
}

// ============================================================================
// Generic triggers
// ============================================================================

#[test]
fn triggered_clip_plays_then_resets_to_rest() {
    let mut world = World::new(EngineConfig::default());
    let door = world.engine.spawn(door());

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: door,
        clip: "Open".into(),
    });

    world.update(0.25);
    assert_eq!(world.active(door), Some("Open"));
    assert!(approx(world.door_position(door).x, 0.5));
    assert!(!world.engine.entity(door).unwrap().context().crossfade().is_fading());

    world.update(0.25);
    assert!(approx(world.door_position(door).x, 1.0));
    world.update(0.25);

    let finished = world.update(0.25);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].clip, "Open");

    let entity = world.engine.entity(door).unwrap();
    assert!(entity.active_clip_name().is_none());
    let part = entity.rig().part_by_name("door").unwrap();
    assert!(approx(part.transform.position.x, 0.5));
    assert!(part.transform.rotation.angle_between(Quat::IDENTITY) < 1e-4);
}

#[test]
fn triggered_clip_resets_after_one_second_at_60hz() {
    let mut world = World::new(EngineConfig::default());
    let door = world.engine.spawn(door());

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: door,
        clip: "Open".into(),
    });

    let mut finished = 0;
    for _ in 0..60 {
        finished += world.update(DT_60HZ).len();
    }

    assert_eq!(finished, 1);
    assert!(world.active(door).is_none());
    assert!(approx(world.door_position(door).x, 0.5));
}

#[test]
fn retrigger_resets_interrupted_parts() {
    let mut world = World::new(EngineConfig::default());
    let door = world.engine.spawn(door());

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: door,
        clip: "Open".into(),
    });
    world.update(0.5);
    assert!(approx(world.door_position(door).x, 1.0));

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: door,
        clip: "Slam".into(),
    });
    world.update(0.5);

    let position = world.door_position(door);
    assert_eq!(world.active(door), Some("Slam"));
    assert!(approx(position.x, 0.5), "got {position}");
    assert!(approx(position.z, -0.5), "got {position}");
}

#[test]
fn repeating_trigger_clip_never_resets() {
    let mut rig = Rig::new();
    rig.add_part("fan", PartTransform::new());
    let spin = AnimationClip::new(
        "Spin",
        vec![Track::new(
            "fan",
            TargetProperty::Rotation,
            TrackData::Quaternion(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Quat::IDENTITY, Quat::from_rotation_z(1.0)],
                InterpolationMode::Linear,
            )),
        )],
    );
    assert_eq!(spin.loop_policy, LoopPolicy::Repeat);

    let mut world = World::new(EngineConfig::default());
    let fan = world
        .engine
        .spawn(AnimatedEntity::generic(rig, Arc::new(ClipSet::from_clips([spin]).unwrap())));

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: fan,
        clip: "Spin".into(),
    });
    for _ in 0..8 {
        assert!(world.update(0.25).is_empty());
    }
    assert_eq!(world.active(fan), Some("Spin"));
    assert_eq!(world.engine.entity(fan).unwrap().context().listeners().len(), 1);
}

#[test]
fn unknown_trigger_clip_is_ignored() {
    let mut world = World::new(EngineConfig::default());
    let door = world.engine.spawn(door());

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: door,
        clip: "Explode".into(),
    });
    assert!(world.update(0.1).is_empty());
    assert!(world.active(door).is_none());
}

#[test]
fn triggers_on_npcs_are_ignored() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);
    world.update(0.1);

    world.bus.publish(WorldEvent::AnimationTriggered {
        entity: npc,
        clip: "Wave".into(),
    });
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));
}

#[test]
fn generic_triggers_restart_unless_locked() {
    let trigger = |world: &mut World, door| {
        world.bus.publish(WorldEvent::AnimationTriggered {
            entity: door,
            clip: "Open".into(),
        });
        world.update(0.25);
        world.engine.entity(door).unwrap().context().active().unwrap().id()
    };

    let mut free = World::new(EngineConfig::default());
    let door = free.engine.spawn(door());
    let first = trigger(&mut free, door);
    assert_ne!(trigger(&mut free, door), first);

    let mut locked = World::new(EngineConfig::default().with_lock_generic_triggers(true));
    let door = locked.engine.spawn(self::door());
    let first = trigger(&mut locked, door);
    assert!(locked.engine.is_interrupt_locked(door));
    assert_eq!(trigger(&mut locked, door), first);
}

// ============================================================================
// force_trigger
// ============================================================================

#[test]
fn force_trigger_errors() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);

    assert_eq!(
        world.engine.force_trigger(npc, "Dance"),
        Err(AnimationError::ClipNotFound("Dance".into()))
    );

    world.engine.despawn(npc);
    assert_eq!(
        world.engine.force_trigger(npc, "Run"),
        Err(AnimationError::EntityNotFound(npc))
    );
}

#[test]
fn forced_loop_holds_until_released() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);
    world.update(0.1);

    world.engine.force_trigger(npc, "Run").unwrap();
    for _ in 0..5 {
        world.update(0.25);
    }
    assert_eq!(world.active(npc), Some("Run"));
    assert!(world.engine.is_interrupt_locked(npc));

    assert!(world.engine.release_interrupt_lock(npc));
    assert!(!world.engine.release_interrupt_lock(npc));
    world.update(0.1);
    assert_eq!(world.active(npc), Some("Idle"));
}

#[test]
fn forced_one_shot_releases_on_completion() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(1);
    world.update(0.1);

    let wave = world.engine.force_trigger(npc, "Wave").unwrap();
    assert!(world.engine.is_interrupt_locked(npc));

    assert!(world.update(0.25).is_empty());
    let finished = world.update(0.25);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].playback, wave);
    assert!(!world.engine.is_interrupt_locked(npc));
}

#[test]
fn force_trigger_overrides_lunge() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) });
    world.update(0.1);
    assert!(world.engine.is_interrupt_locked(npc));

    let wave = world.engine.force_trigger(npc, "Wave").unwrap();
    let ctx = world.engine.entity(npc).unwrap().context();
    assert_eq!(ctx.active().unwrap().id(), wave);
    assert_eq!(ctx.listeners().len(), 1);
}

// ============================================================================
// Subscription lifecycle
// ============================================================================

#[test]
fn engine_subscribes_once() {
    let mut world = World::new(EngineConfig::default());
    world.spawn_npc(1);
    assert_eq!(world.bus.subscriber_count(), 1);

    for _ in 0..10 {
        world.update(0.1);
    }
    assert_eq!(world.bus.subscriber_count(), 1);
    assert_eq!(world.bus.subscriber_count_for(EventKind::NpcMeleeAttack), 1);
    assert_eq!(world.bus.subscriber_count_for(EventKind::AnimationTriggered), 1);
}

#[test]
fn dispose_unsubscribes_and_is_idempotent() {
    let mut world = World::new(EngineConfig::default());
    let npc = world.spawn_npc(7);
    world.update(0.1);

    world.engine.dispose(&mut world.bus);
    assert!(world.engine.is_disposed());
    assert_eq!(world.bus.subscriber_count(), 0);

    world.engine.dispose(&mut world.bus);
    assert_eq!(world.bus.subscriber_count(), 0);

    // Events no longer reach the engine, but it keeps animating
    assert_eq!(world.bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(7) }), 0);
    world.update(0.1);
    assert!(!world.engine.is_interrupt_locked(npc));
    assert_eq!(world.active(npc), Some("Idle"));
}

#[test]
fn dropped_engine_is_pruned_on_publish() {
    let mut bus = EventBus::new();
    let engine = AnimationEngine::new(EngineConfig::default(), &mut bus);
    drop(engine);
    assert_eq!(bus.subscriber_count(), 1);

    assert_eq!(bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(1) }), 0);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn gateway_keeps_publish_order_across_kinds() {
    let mut bus = EventBus::new();
    let gateway = EventGateway::new(&mut bus);
    let entity = EntityKey::default();

    let published = vec![
        WorldEvent::AnimationTriggered {
            entity,
            clip: "Open".into(),
        },
        WorldEvent::NpcMeleeAttack { body: BodyHandle(1) },
        WorldEvent::AnimationTriggered {
            entity,
            clip: "Slam".into(),
        },
    ];
    for event in &published {
        assert_eq!(bus.publish(event.clone()), 1);
    }

    assert_eq!(gateway.pending(), published);
    assert!(gateway.pending().is_empty());

    gateway.dispose(&mut bus);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn bus_delivers_by_kind() {
    let mut bus = EventBus::new();
    let melee = bus.subscribe(EventKind::NpcMeleeAttack);
    let triggers = bus.subscribe(EventKind::AnimationTriggered);

    bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(3) });
    bus.publish(WorldEvent::NpcMeleeAttack { body: BodyHandle(4) });

    assert_eq!(melee.pending(), 2);
    assert_eq!(triggers.pending(), 0);
    let bodies: Vec<_> = melee
        .drain()
        .map(|event| match event {
            WorldEvent::NpcMeleeAttack { body } => body,
            WorldEvent::AnimationTriggered { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(bodies, vec![BodyHandle(3), BodyHandle(4)]);
    assert_eq!(melee.pending(), 0);

    assert!(bus.unsubscribe(melee.key()));
    assert!(!bus.unsubscribe(melee.key()));
}
