//! Typed event system with pre-allocated ring buffers.
//!
//! Events are the core's diagnostic surface: command refusals, phase
//! transitions, and model transitions (extinction, toxicity crossings) are
//! recorded here for presentation layers to drain. Each event kind has its
//! own [`EventBuffer`] ring with a configurable capacity; kinds can be
//! suppressed at zero cost.
//!
//! Model transitions are emitted on *crossings*, not every tick: a species
//! fires `SpeciesWentExtinct` once when its biomass reaches zero, and the
//! toxicity events fire when the level crosses 1.0 in either direction.

use crate::commands::RefusalReason;
use crate::fixed::{Fixed64, Ticks};
use crate::pool::Pool;
use crate::species::SpeciesId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A jar event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Phase / editing --
    JarSealed {
        tick: Ticks,
    },
    JarReset {
        tick: Ticks,
    },
    OrganismAdded {
        species: SpeciesId,
        biomass: Fixed64,
        tick: Ticks,
    },
    OrganismRemoved {
        species: SpeciesId,
        biomass: Fixed64,
        tick: Ticks,
    },
    ResourceAdded {
        pool: Pool,
        amount: Fixed64,
        tick: Ticks,
    },
    CommandRefused {
        reason: RefusalReason,
        tick: Ticks,
    },

    // -- Model transitions --
    SpeciesWentExtinct {
        species: SpeciesId,
        tick: Ticks,
    },
    ToxicityThresholdCrossed {
        level: Fixed64,
        tick: Ticks,
    },
    ToxicityCleared {
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JarSealed,
    JarReset,
    OrganismAdded,
    OrganismRemoved,
    ResourceAdded,
    CommandRefused,
    SpeciesWentExtinct,
    ToxicityThresholdCrossed,
    ToxicityCleared,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 9;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::JarSealed { .. } => EventKind::JarSealed,
            Event::JarReset { .. } => EventKind::JarReset,
            Event::OrganismAdded { .. } => EventKind::OrganismAdded,
            Event::OrganismRemoved { .. } => EventKind::OrganismRemoved,
            Event::ResourceAdded { .. } => EventKind::ResourceAdded,
            Event::CommandRefused { .. } => EventKind::CommandRefused,
            Event::SpeciesWentExtinct { .. } => EventKind::SpeciesWentExtinct,
            Event::ToxicityThresholdCrossed { .. } => EventKind::ToxicityThresholdCrossed,
            Event::ToxicityCleared { .. } => EventKind::ToxicityCleared,
        }
    }
}

impl EventKind {
    /// Convert to usize index for array lookups.
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    /// Pre-allocated storage.
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored (may be less than capacity).
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    /// The total capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    /// Number of events currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> EventBufferIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points to the next write position, which is the oldest entry
            self.head
        };
        EventBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Clear all events from the buffer.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over events in an [`EventBuffer`], from oldest to newest.
pub struct EventBufferIter<'a> {
    buffer: &'a EventBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for EventBufferIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.buffer.events[self.index].as_ref();
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventBufferIter<'_> {}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only, in registration order.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The central event bus. Holds one ring buffer per event kind, listener
/// lists, and suppression flags.
pub struct EventBus {
    /// One ring buffer per event kind, lazily allocated on first emit.
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],

    /// Suppressed event kinds. Suppressed events are never buffered.
    suppressed: [bool; EVENT_KIND_COUNT],

    /// Passive listeners indexed by event kind.
    listeners: [Vec<PassiveListener>; EVENT_KIND_COUNT],

    /// Default buffer capacity for new event buffers.
    default_capacity: usize,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

const fn empty_listener_array() -> [Vec<PassiveListener>; EVENT_KIND_COUNT] {
    // Cannot use Default in const context, so we build it manually.
    [
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    ]
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    /// Create a new event bus with the given default buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: empty_listener_array(),
            default_capacity,
        }
    }

    /// Suppress an event kind. Suppressed events are never allocated or
    /// buffered, and listeners for them are not called.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    /// Check if an event kind is suppressed.
    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Emit an event: buffer it and call its listeners immediately.
    /// No-ops if the event kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();

        if self.suppressed[idx] {
            return;
        }

        for listener in &mut self.listeners[idx] {
            listener(&event);
        }

        // Lazily allocate buffer on first emit.
        if self.buffers[idx].is_none() {
            self.buffers[idx] = Some(EventBuffer::new(self.default_capacity));
        }
        self.buffers[idx].as_mut().unwrap().push(event);
    }

    /// Register a passive listener for an event kind.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.listeners[kind.index()].push(listener);
    }

    /// Buffered events of a kind, oldest first. Empty for kinds that never
    /// fired or are suppressed.
    pub fn events(&self, kind: EventKind) -> Vec<Event> {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drain all buffered events of a kind, oldest first.
    pub fn drain(&mut self, kind: EventKind) -> Vec<Event> {
        let Some(buffer) = self.buffers[kind.index()].as_mut() else {
            return Vec::new();
        };
        let events: Vec<Event> = buffer.iter().cloned().collect();
        buffer.clear();
        events
    }

    /// Clear every buffer (listeners and suppression flags are kept).
    pub fn clear(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
