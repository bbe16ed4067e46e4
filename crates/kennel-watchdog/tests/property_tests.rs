//! Property-based tests for registry invariants.
//!
//! The registry is driven directly (single-threaded, as if the lock were
//! held) against a flat reference model: a map of countdowns plus the
//! insertion order. Whatever sequence of operations runs, the links stay
//! consistent and the arena agrees with the model.

use kennel_watchdog::{DogRecord, Registry, WorkerId};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    Create { id: u64, timeout: u32 },
    Feed { id: u64 },
    Delete { id: u64 },
    Sweep,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..8u64, 1..6u32).prop_map(|(id, timeout)| Op::Create { id, timeout }),
        (1..8u64).prop_map(|id| Op::Feed { id }),
        (1..8u64).prop_map(|id| Op::Delete { id }),
        Just(Op::Sweep),
    ]
}

/// Reference model: countdowns per identity plus registration order.
#[derive(Debug, Default)]
struct Model {
    dogs: BTreeMap<u64, (u32, u32)>, // id -> (timeout, countdown)
    order: Vec<u64>,
}

impl Model {
    fn create(&mut self, id: u64, timeout: u32) -> bool {
        if self.dogs.contains_key(&id) {
            return false;
        }
        self.dogs.insert(id, (timeout, timeout));
        self.order.push(id);
        true
    }

    fn feed(&mut self, id: u64) -> bool {
        match self.dogs.get_mut(&id) {
            Some((timeout, countdown)) => {
                *countdown = *timeout;
                true
            }
            None => false,
        }
    }

    fn delete(&mut self, id: u64) -> bool {
        if self.dogs.remove(&id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    /// First exhausted dog in registration order wins; dogs visited before
    /// it age by one, dogs after it are untouched.
    fn sweep(&mut self) -> Option<u64> {
        for &id in &self.order.clone() {
            if let Some((_, countdown)) = self.dogs.get_mut(&id) {
                if *countdown == 0 {
                    return Some(id);
                }
                *countdown -= 1;
            }
        }
        None
    }
}

proptest! {
    #[test]
    fn test_registry_matches_model(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut registry = Registry::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Create { id, timeout } => {
                    let identity = WorkerId::from_raw(id);
                    // One dog per identity, as the lifecycle API enforces.
                    if registry.find(identity).is_none() {
                        registry.push(DogRecord::new(format!("dog_{id}"), identity, timeout));
                        prop_assert!(model.create(id, timeout));
                    } else {
                        prop_assert!(!model.create(id, timeout));
                    }
                }
                Op::Feed { id } => {
                    let identity = WorkerId::from_raw(id);
                    let fed = match registry.find(identity) {
                        Some(slot) => {
                            if let Some(record) = registry.get_mut(slot) {
                                record.feed();
                            }
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(fed, model.feed(id));
                }
                Op::Delete { id } => {
                    let identity = WorkerId::from_raw(id);
                    let removed = match registry.find(identity) {
                        Some(slot) => registry.remove(slot).is_some(),
                        None => false,
                    };
                    prop_assert_eq!(removed, model.delete(id));
                }
                Op::Sweep => {
                    let expired = registry.sweep().map(|dead| dead.identity.as_u64());
                    prop_assert_eq!(expired, model.sweep());
                }
            }

            prop_assert!(registry.is_consistent());
            prop_assert_eq!(registry.len(), model.dogs.len());
            for (&id, &(timeout, countdown)) in &model.dogs {
                let snapshot = registry.snapshot(WorkerId::from_raw(id));
                prop_assert!(snapshot.is_some());
                if let Some(snapshot) = snapshot {
                    prop_assert_eq!(snapshot.timeout, timeout);
                    prop_assert_eq!(snapshot.countdown, countdown);
                }
            }
        }
    }

    #[test]
    fn test_countdown_never_exceeds_timeout(
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let mut registry = Registry::new();

        for op in ops {
            match op {
                Op::Create { id, timeout } => {
                    let identity = WorkerId::from_raw(id);
                    if registry.find(identity).is_none() {
                        registry.push(DogRecord::new(format!("dog_{id}"), identity, timeout));
                    }
                }
                Op::Feed { id } => {
                    if let Some(slot) = registry.find(WorkerId::from_raw(id)) {
                        if let Some(record) = registry.get_mut(slot) {
                            record.feed();
                        }
                    }
                }
                Op::Delete { id } => {
                    if let Some(slot) = registry.find(WorkerId::from_raw(id)) {
                        registry.remove(slot);
                    }
                }
                Op::Sweep => {
                    registry.sweep();
                }
            }

            for id in 1..8u64 {
                if let Some(snapshot) = registry.snapshot(WorkerId::from_raw(id)) {
                    prop_assert!(snapshot.countdown <= snapshot.timeout);
                }
            }
        }
    }

    #[test]
    fn test_regular_feeding_prevents_expiry(
        timeout in 2..10u32,
        rounds in 1..50u32,
    ) {
        let mut registry = Registry::new();
        let identity = WorkerId::from_raw(1);
        registry.push(DogRecord::new("fed", identity, timeout));

        // Feed after every timeout-1 sweeps: always inside the budget.
        for _ in 0..rounds {
            for _ in 0..timeout - 1 {
                prop_assert!(registry.sweep().is_none());
            }
            if let Some(slot) = registry.find(identity) {
                if let Some(record) = registry.get_mut(slot) {
                    record.feed();
                }
            }
        }
        prop_assert!(registry.is_consistent());
    }

    #[test]
    fn test_starved_dog_expires_exactly_on_schedule(timeout in 1..30u32) {
        let mut registry = Registry::new();
        registry.push(DogRecord::new("starved", WorkerId::from_raw(1), timeout));

        for _ in 0..timeout {
            prop_assert!(registry.sweep().is_none());
        }
        let expired = registry.sweep();
        prop_assert!(expired.is_some());
    }

    #[test]
    fn test_slot_reuse_keeps_identities_distinct(ids in prop::collection::vec(1..50u64, 1..40)) {
        let mut registry = Registry::new();

        // Churn one slot per identity: every create is followed by a
        // remove, so the arena keeps reusing a handful of slots.
        for id in ids {
            let identity = WorkerId::from_raw(id);
            if registry.find(identity).is_none() {
                let slot = registry.push(DogRecord::new(format!("dog_{id}"), identity, 5));
                prop_assert_eq!(registry.find(identity), Some(slot));
                prop_assert!(registry.remove(slot).is_some());
                prop_assert_eq!(registry.find(identity), None);
            }
            prop_assert!(registry.is_consistent());
        }
        prop_assert!(registry.is_empty());
    }
}
