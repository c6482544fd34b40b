//! Fixed-capacity ring buffer of UI events.
//!
//! Items push events while a frame is being updated; the host drains them
//! once per frame. `head == tail` means empty, so one slot is always left
//! unused and the queue holds at most `capacity - 1` events.

use crate::error::{Result, UiError};
use crate::id::ItemId;

/// Something the host application may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A button was activated by click, Space or Enter.
    Button { id: ItemId },

    /// A list's selection changed, or the selected row was activated
    /// (`expand` is set for Enter, Space and clicks).
    ListSelection {
        id: ItemId,
        index: usize,
        expand: bool,
    },

    /// Keyboard focus moved. `scope` is the toplevel container holding the
    /// newly focused item.
    FocusChange {
        now_focused: Option<ItemId>,
        now_unfocused: Option<ItemId>,
        scope: Option<ItemId>,
    },

    /// The text of a text input was edited.
    TextChange { id: ItemId },
}

#[derive(Debug)]
pub struct EventQueue {
    slots: Vec<Option<Event>>,
    head: usize,
    tail: usize,
}

impl EventQueue {
    /// Create a queue with `capacity` slots. At least two slots are allocated.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            slots: vec![None; capacity],
            head: 0,
            tail: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn len(&self) -> usize {
        (self.tail + self.capacity() - self.head) % self.capacity()
    }

    /// Append an event. A full queue is reported, never overwritten.
    pub fn enqueue(&mut self, event: Event) -> Result<()> {
        let next = (self.tail + 1) % self.capacity();
        if next == self.head {
            return Err(UiError::QueueFull {
                capacity: self.capacity(),
            });
        }
        self.slots[self.tail] = Some(event);
        self.tail = next;
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<Event> {
        if self.is_empty() {
            return None;
        }
        let event = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        event
    }

    /// Dequeue everything currently queued, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        std::iter::from_fn(move || self.dequeue())
    }

    /// Push an event produced during a frame. Overflow means more events were
    /// produced than the queue was sized for; the event is dropped and logged.
    pub(crate) fn emit(&mut self, event: Event) {
        if let Err(err) = self.enqueue(event) {
            tracing::error!(error = %err, "dropping UI event");
            debug_assert!(false, "event queue overflow: {err}");
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(32)
    }
}
