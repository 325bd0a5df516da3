use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;
use vidchoice_core::TimerId;
use vidchoice_trial::TrialEvent;

#[derive(Debug)]
struct Entry {
    due_ns: u64,
    seq: u64,
    event: TrialEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        (self.due_ns, self.seq) == (other.due_ns, other.seq)
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the heap pops the earliest deadline; ties keep insertion order.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_ns, other.seq).cmp(&(self.due_ns, self.seq))
    }
}

/// Whole nanoseconds in `d`, saturating at `u64::MAX`
pub fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Pending host events ordered by deadline
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl EventQueue {
    pub fn push_at(&mut self, due_ns: u64, event: TrialEvent) {
        self.seq += 1;
        self.heap.push(Entry {
            due_ns,
            seq: self.seq,
            event,
        });
    }

    pub fn pop(&mut self) -> Option<(u64, TrialEvent)> {
        self.heap.pop().map(|e| (e.due_ns, e.event))
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        self.heap
            .retain(|e| e.event != TrialEvent::TimerElapsed(id));
    }

    /// Drops everything, as when the view stops listening
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
