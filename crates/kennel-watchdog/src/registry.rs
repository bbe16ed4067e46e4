//! Dog records and the registry that owns them.
//!
//! The registry is an arena of record slots threaded into a doubly-linked
//! list by slot index: sweep order is insertion order, removal is slot
//! invalidation, and freed slots are reused. No component reads or mutates
//! it without holding the single watchdog mutex; the `Registry` type itself
//! is plain data and never decides to terminate anything: aging and the
//! fatal action belong to the monitor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::WorkerId;

/// One worker's liveness contract.
///
/// Created with a full countdown; `feed` refills it, each monitor tick
/// drains one unit, and a countdown of zero at sweep time means the owner
/// is dead.
#[derive(Debug, Clone)]
pub struct DogRecord {
    /// Display label, owner-supplied.
    pub name: String,
    /// Identity of the owning worker; the lookup key.
    pub identity: WorkerId,
    /// Configured budget in ticks.
    pub timeout: u32,
    /// Remaining budget in ticks.
    pub countdown: u32,
    prev: Option<usize>,
    next: Option<usize>,
}

impl DogRecord {
    /// Create a record with a full countdown.
    #[must_use]
    pub fn new(name: impl Into<String>, identity: WorkerId, timeout: u32) -> Self {
        Self {
            name: name.into(),
            identity,
            timeout,
            countdown: timeout,
            prev: None,
            next: None,
        }
    }

    /// Refill the countdown to the configured timeout.
    pub fn feed(&mut self) {
        self.countdown = self.timeout;
    }

    /// Whether the countdown has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.countdown == 0
    }

    /// Observer copy of the record.
    #[must_use]
    pub fn snapshot(&self) -> DogSnapshot {
        DogSnapshot {
            name: self.name.clone(),
            identity: self.identity,
            timeout: self.timeout,
            countdown: self.countdown,
        }
    }
}

/// Point-in-time view of one dog, for `dump` and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogSnapshot {
    /// Display label.
    pub name: String,
    /// Owning worker.
    pub identity: WorkerId,
    /// Configured budget in ticks.
    pub timeout: u32,
    /// Remaining budget in ticks.
    pub countdown: u32,
}

impl fmt::Display for DogSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-------- watch-dog --------\n\
             name:      {}\n\
             tid:       {}\n\
             timeout:   {}\n\
             countdown: {}",
            self.name, self.identity, self.timeout, self.countdown
        )
    }
}

/// The dog the monitor found dead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredDog {
    /// Display label.
    pub name: String,
    /// Owning worker.
    pub identity: WorkerId,
    /// Configured budget in ticks.
    pub timeout: u32,
}

impl fmt::Display for ExpiredDog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread<{}> dead(tid = {})", self.name, self.identity)
    }
}

/// Registry of all live dog records.
///
/// `head`/`tail` and the per-record links form the sweep order; `free`
/// holds vacated slots for reuse. Invariants: a slot is either linked or
/// on the free list, never both; adjacent records agree on their links;
/// `head` is `None` exactly when `tail` is and the registry is empty.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<DogRecord>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live dogs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the registry holds no dogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn record(&self, slot: usize) -> Option<&DogRecord> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn record_mut(&mut self, slot: usize) -> Option<&mut DogRecord> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Append a record at the tail. Returns the slot it now occupies.
    pub fn push(&mut self, mut record: DogRecord) -> usize {
        record.prev = self.tail;
        record.next = None;

        let slot = if let Some(slot) = self.free.pop() {
            if let Some(entry) = self.slots.get_mut(slot) {
                *entry = Some(record);
            }
            slot
        } else {
            self.slots.push(Some(record));
            self.slots.len() - 1
        };

        match self.tail {
            Some(tail) => {
                if let Some(prev_record) = self.record_mut(tail) {
                    prev_record.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        slot
    }

    /// Unlink and return the record in `slot`.
    ///
    /// Membership is verified by re-scanning the list before any link is
    /// touched, so a slot that was already removed (or never linked) is a
    /// safe no-op returning `None`. O(n), which is the price of keeping
    /// removal safe against double-removal if a second removal path is
    /// ever added.
    pub fn remove(&mut self, slot: usize) -> Option<DogRecord> {
        let mut linked = false;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            if current == slot {
                linked = true;
                break;
            }
            cursor = self.record(current)?.next;
        }
        if !linked {
            return None;
        }

        let record = self.slots.get_mut(slot)?.take()?;
        match record.prev {
            Some(prev) => {
                if let Some(prev_record) = self.record_mut(prev) {
                    prev_record.next = record.next;
                }
            }
            None => self.head = record.next,
        }
        match record.next {
            Some(next) => {
                if let Some(next_record) = self.record_mut(next) {
                    next_record.prev = record.prev;
                }
            }
            None => self.tail = record.prev,
        }

        self.free.push(slot);
        self.len = self.len.saturating_sub(1);
        Some(record)
    }

    /// Find the slot of the first record owned by `identity`.
    #[must_use]
    pub fn find(&self, identity: WorkerId) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let record = self.record(slot)?;
            if record.identity == identity {
                return Some(slot);
            }
            cursor = record.next;
        }
        None
    }

    /// Shared access to the record in `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&DogRecord> {
        self.record(slot)
    }

    /// Exclusive access to the record in `slot`.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut DogRecord> {
        self.record_mut(slot)
    }

    /// Observer copy of the dog owned by `identity`.
    #[must_use]
    pub fn snapshot(&self, identity: WorkerId) -> Option<DogSnapshot> {
        self.find(identity)
            .and_then(|slot| self.record(slot))
            .map(DogRecord::snapshot)
    }

    /// One monitor tick over the registry, in list order.
    ///
    /// The first record whose countdown has already run out is returned as
    /// expired; the check happens before the decrement, so a dog created
    /// with timeout N survives exactly N sweeps. Every record visited
    /// before an expiry is found loses one unit; an expired record is left
    /// in place, since the fatal action makes its destruction moot.
    pub fn sweep(&mut self) -> Option<ExpiredDog> {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let record = self.record_mut(slot)?;
            if record.is_expired() {
                return Some(ExpiredDog {
                    name: record.name.clone(),
                    identity: record.identity,
                    timeout: record.timeout,
                });
            }
            record.countdown = record.countdown.saturating_sub(1);
            cursor = record.next;
        }
        None
    }

    /// Full structural check: forward walk agrees with back-links, `tail`,
    /// and `len`; every occupied slot is reachable; the free list holds
    /// exactly the vacant slots, each once.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut count = 0usize;
        let mut previous: Option<usize> = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(record) = self.record(slot) else {
                return false;
            };
            if record.prev != previous {
                return false;
            }
            previous = Some(slot);
            cursor = record.next;
            count += 1;
            if count > self.slots.len() {
                return false;
            }
        }
        if self.tail != previous || count != self.len {
            return false;
        }

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        if occupied != self.len {
            return false;
        }

        let mut on_free_list = vec![false; self.slots.len()];
        for &slot in &self.free {
            if !matches!(self.slots.get(slot), Some(None)) {
                return false;
            }
            match on_free_list.get_mut(slot) {
                Some(flag) if !*flag => *flag = true,
                _ => return false,
            }
        }
        self.free.len() + self.len == self.slots.len()
    }
}
