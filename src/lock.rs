// per-(set, way) directory entry locks with a FIFO queue of suspended
// accesses
//
// Waiters are served strictly in arrival order. An earlier version of this
// protocol inserted waiters by access id, which let a retrying up-down
// access starve a waiting down-up access into deadlock; plain FIFO avoids
// that.

use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, log_enabled, trace, Level};

use crate::access::Access;
use crate::directory::Directory;
use crate::event_q::{EventId, EventScheduler};

struct Waiter {
    access: Rc<Access>,
    event: EventId,
}

pub struct DirLock {
    locked: bool,
    holder: u64, // access id of the current holder, diagnostics only
    queue: VecDeque<Waiter>,
}

impl DirLock {
    pub(crate) fn new() -> Self {
        DirLock {
            locked: false,
            holder: 0,
            queue: VecDeque::new(),
        }
    }
}

impl Directory {
    /// Try to take the (x, y) entry lock for `access`. On contention the
    /// access is appended to the lock's wait queue together with its resume
    /// `event` and false is returned; the caller must suspend and wait to be
    /// rescheduled by a later unlock().
    pub fn lock(&mut self, x: i32, y: i32, event: EventId, access: Rc<Access>) -> bool {
        let i = self.lock_index(x, y);
        let lock = &mut self.locks[i];

        if lock.locked {
            debug!("    0x{:x} access suspended", access.tag);
            lock.queue.push_back(Waiter { access, event });
            return false;
        }

        lock.locked = true;
        lock.holder = access.id;
        trace!(target: "mem",
            "mem.new_access_block cache=\"{}\" access=\"A-{}\" set={} way={}",
            self.name, access.id, x, y);
        true
    }

    /// Release the (x, y) entry lock. If accesses are waiting, the head of
    /// the queue has its resume event scheduled one cycle out and the lock
    /// stays held with that access as the new holder -- the hand-off is
    /// atomic within the single-threaded simulation, so nothing can slip in
    /// between the unlock and the resumed access re-entering. With an empty
    /// queue the lock becomes free.
    pub fn unlock(&mut self, x: i32, y: i32, sched: &mut dyn EventScheduler) {
        let i = self.lock_index(x, y);
        let lock = &mut self.locks[i];
        assert!(lock.locked, "unlock of unlocked directory entry");
        let released = lock.holder;

        if let Some(waiter) = lock.queue.pop_front() {
            if log_enabled!(Level::Debug) {
                if lock.queue.is_empty() {
                    debug!("    A-{} resumed", waiter.access.id);
                } else {
                    let waiting: Vec<String> = lock
                        .queue
                        .iter()
                        .map(|w| format!("A-{}", w.access.id))
                        .collect();
                    debug!("    A-{} resumed - {{ {} }} still waiting",
                        waiter.access.id, waiting.join(" "));
                }
            }
            lock.holder = waiter.access.id;
            sched.schedule(waiter.event, waiter.access, 1);
        } else {
            lock.locked = false;
        }

        trace!(target: "mem",
            "mem.end_access_block cache=\"{}\" access=\"A-{}\" set={} way={}",
            self.name, released, x, y);
    }

    pub fn is_locked(&self, x: i32, y: i32) -> bool {
        self.locks[self.lock_index(x, y)].locked
    }

    /// access id of the current lock holder, if the lock is held
    pub fn lock_holder(&self, x: i32, y: i32) -> Option<u64> {
        let lock = &self.locks[self.lock_index(x, y)];
        lock.locked.then_some(lock.holder)
    }

    pub fn waiter_count(&self, x: i32, y: i32) -> usize {
        self.locks[self.lock_index(x, y)].queue.len()
    }
}
