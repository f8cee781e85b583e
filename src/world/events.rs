//! World event bus.
//!
//! Push-based: publishers call [`EventBus::publish`], every live subscriber
//! of that event kind gets a copy queued on its own `flume` channel and drains
//! it whenever it runs. A subscription may cover several kinds. Subscribers unsubscribe explicitly with
//! [`EventBus::unsubscribe`]; a subscriber whose receiver was dropped is
//! pruned on the next publish.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::world::{BodyHandle, EntityKey};

new_key_type! {
    pub struct SubscriptionKey;
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// Play `clip` on `entity`.
    AnimationTriggered { entity: EntityKey, clip: String },
    /// The NPC owning `body` starts a melee attack.
    NpcMeleeAttack { body: BodyHandle },
}

impl WorldEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::AnimationTriggered { .. } => EventKind::AnimationTriggered,
            WorldEvent::NpcMeleeAttack { .. } => EventKind::NpcMeleeAttack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AnimationTriggered,
    NpcMeleeAttack,
}

#[derive(Debug)]
struct Subscriber {
    kinds: SmallVec<[EventKind; 2]>,
    sender: flume::Sender<WorldEvent>,
}

/// The receiving end handed out by [`EventBus::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    key: SubscriptionKey,
    receiver: flume::Receiver<WorldEvent>,
}

impl Subscription {
    #[inline]
    #[must_use]
    pub fn key(&self) -> SubscriptionKey {
        self.key
    }

    /// Takes every event queued so far without blocking.
    pub fn drain(&self) -> impl Iterator<Item = WorldEvent> + '_ {
        self.receiver.try_iter()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: SlotMap<SubscriptionKey, Subscriber>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind) -> Subscription {
        self.subscribe_to(&[kind])
    }

    /// Subscribes one channel to several event kinds. Events arrive in the
    /// order they were published, whatever their kind.
    pub fn subscribe_to(&mut self, kinds: &[EventKind]) -> Subscription {
        let (sender, receiver) = flume::unbounded();
        let kinds: SmallVec<[EventKind; 2]> = kinds.iter().copied().collect();
        log::trace!("EventBus: subscribing to {kinds:?}");
        let key = self.subscribers.insert(Subscriber { kinds, sender });
        Subscription { key, receiver }
    }

    /// Returns `false` if the key was not subscribed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    /// Delivers `event` to every subscriber of its kind. Returns the number of
    /// subscribers reached.
    pub fn publish(&mut self, event: WorldEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;

        self.subscribers.retain(|key, subscriber| {
            if !subscriber.kinds.contains(&kind) {
                return true;
            }
            if subscriber.sender.send(event.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                log::debug!("EventBus: pruning disconnected subscriber {key:?}");
                false
            }
        });

        delivered
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count_for(&self, kind: EventKind) -> usize {
        self.subscribers.values().filter(|s| s.kinds.contains(&kind)).count()
    }
}
