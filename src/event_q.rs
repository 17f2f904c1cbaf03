// implements the discrete-event queue that resumes suspended accesses

use std::collections::VecDeque;
use std::rc::Rc;

use crate::access::Access;

/// identifies the continuation to re-enter when an access is resumed
pub type EventId = i32;

/// The one scheduler capability the directory needs: queue a resumption
/// event for a suspended access, `delay` simulated cycles from now.
pub trait EventScheduler {
    fn schedule(&mut self, event: EventId, access: Rc<Access>, delay: i32);
}

/*
    In ScheduledEvent, `t` stands for the timestamp at which the event fires,
    whereas the `delay` passed to schedule() is relative to the current time.
 */

struct ScheduledEvent {
    t: i32,
    event: EventId,
    access: Rc<Access>,
}

// event queue

pub struct EventQ {
    time: i32,
    q: VecDeque<ScheduledEvent>,
    key_first: Option<i32>,
    key_last: Option<i32>,
}

impl EventQ {
    pub fn new() -> Self {
        EventQ {
            time: 0,
            q: VecDeque::new(),
            key_first: None,
            key_last: None,
        }
    }
    /// Pop the next event due at the current time, if any. Events with
    /// equal timestamps come out in the order they were scheduled.
    pub fn try_fetch(&mut self) -> Option<(EventId, Rc<Access>)> {
        if let Some(ev) = self.q.front() {
            if ev.t > self.time {
                return None;
            }
        }
        let ev = self.q.pop_front().map(|ev| (ev.event, ev.access));
        self.update_keys();
        ev
    }
    pub fn update_time(&mut self, new_time: i32) {
        self.time = new_time;
    }
    pub fn time(&self) -> i32 {
        self.time
    }
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
    pub fn event_available(&self) -> bool {
        self.key_first.map_or(false, |t| t <= self.time)
    }
    fn update_keys(&mut self) {
        self.key_first = self.q.front().map(|ev| ev.t);
        self.key_last = self.q.back().map(|ev| ev.t);
    }
}

impl Default for EventQ {
    fn default() -> Self {
        EventQ::new()
    }
}

impl EventScheduler for EventQ {
    fn schedule(&mut self, event: EventId, access: Rc<Access>, delay: i32) {
        let ev = ScheduledEvent {
            t: self.time + delay,
            event,
            access,
        };
        let t = ev.t;
        if t >= self.key_last.unwrap_or(i32::MIN) {
            self.q.push_back(ev);
        } else if t < self.key_first.unwrap_or(i32::MAX) {
            self.q.push_front(ev);
        } else {
            let mut i = 0;
            for e in self.q.iter() {
                if e.t > t {
                    break;
                }
                i += 1;
            }
            self.q.insert(i, ev);
        }
        self.update_keys();
    }
}
