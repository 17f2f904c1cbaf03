use std::rc::Rc;

use cohdir_rs::{Access, DirSpec, Directory, EventQ, EventScheduler, SharerTree};

const EV_RESUME: i32 = 7;

fn small_dir() -> Directory {
    Directory::new(
        "test-dir",
        DirSpec {
            xsize: 4,
            ysize: 2,
            zsize: 1,
            num_nodes: 8,
        },
    )
}

#[test]
fn test_sharer_tree_insert_remove() {
    let mut tree = SharerTree::new();
    assert_eq!(tree.count(), 0);
    assert!(!tree.contains(3));

    assert!(tree.insert(3));
    assert!(tree.contains(3));
    assert_eq!(tree.count(), 1);

    // idempotent
    assert!(!tree.insert(3));
    assert_eq!(tree.count(), 1);

    assert!(tree.remove(3));
    assert!(!tree.contains(3));
    assert_eq!(tree.count(), 0);

    // removing an absent id is a no-op
    assert!(!tree.remove(3));
    assert_eq!(tree.count(), 0);

    // a tombstoned slot is revalidated in place
    assert!(tree.insert(3));
    assert!(tree.contains(3));
    assert_eq!(tree.count(), 1);
}

#[test]
fn test_sharer_tree_count_tracks_membership() {
    let mut tree = SharerTree::new();
    let ids = [5, 2, 8, 1, 3, 7, 9, 6];
    for id in ids {
        tree.insert(id);
    }
    assert_eq!(tree.count(), 8);
    assert_eq!(tree.members(), vec![1, 2, 3, 5, 6, 7, 8, 9]);

    tree.remove(5);
    tree.remove(1);
    tree.remove(9);
    assert_eq!(tree.count(), 5);
    assert_eq!(tree.members(), vec![2, 3, 6, 7, 8]);

    tree.clear();
    assert_eq!(tree.count(), 0);
    for id in ids {
        assert!(!tree.contains(id));
    }
}

#[test]
fn test_sharer_tree_compact_preserves_members() {
    let mut tree = SharerTree::new();
    for id in [50, 20, 80, 10, 30, 70, 90, 25, 35] {
        tree.insert(id);
    }
    // tombstone a leaf, a one-child node and the root
    tree.remove(10);
    tree.remove(30); // has children 25 and 35
    tree.remove(50); // root, two children

    tree.compact();
    assert_eq!(tree.members(), vec![20, 25, 35, 70, 80, 90]);
    assert_eq!(tree.count(), 6);

    // the tree still behaves after physical deletion
    assert!(tree.insert(30));
    assert!(tree.insert(10));
    assert!(!tree.insert(25));
    assert_eq!(tree.members(), vec![10, 20, 25, 30, 35, 70, 80, 90]);
}

#[test]
fn test_directory_sharer_scenario() {
    let mut dir = small_dir();

    dir.add_sharer(0, 0, 0, 3);
    assert!(dir.is_sharer(0, 0, 0, 3));
    assert_eq!(dir.sharer_count(0, 0, 0), 1);

    // duplicate add does not change the count
    dir.add_sharer(0, 0, 0, 3);
    assert_eq!(dir.sharer_count(0, 0, 0), 1);

    dir.remove_sharer(0, 0, 0, 3);
    assert_eq!(dir.sharer_count(0, 0, 0), 0);
    assert!(!dir.is_sharer(0, 0, 0, 3));

    // every attempt counts, successful or not
    let entry = dir.entry(0, 0, 0);
    assert_eq!(entry.sharer_adds, 2);
    assert_eq!(entry.sharer_removes, 1);
}

#[test]
fn test_directory_clear_all_sharers() {
    let mut dir = small_dir();
    for node in [1, 4, 6] {
        dir.add_sharer(2, 0, 0, node);
    }
    assert_eq!(dir.sharer_count(2, 0, 0), 3);

    dir.clear_all_sharers(2, 0, 0);
    assert_eq!(dir.sharer_count(2, 0, 0), 0);
    for node in [1, 4, 6] {
        assert!(!dir.is_sharer(2, 0, 0, node));
    }
    assert_eq!(dir.entry(2, 0, 0).full_invals, 1);
}

#[test]
fn test_owner_and_group_query() {
    let mut dir = small_dir();

    dir.set_owner(2, 1, 0, Some(5));
    assert_eq!(dir.owner(2, 1, 0), Some(5));
    assert!(dir.group_shared_or_owned(2, 1));

    dir.set_owner(2, 1, 0, None);
    assert_eq!(dir.owner(2, 1, 0), None);
    assert!(!dir.group_shared_or_owned(2, 1));

    // a lone sharer also marks the group
    dir.add_sharer(2, 1, 0, 0);
    assert!(dir.group_shared_or_owned(2, 1));
}

#[test]
fn test_lock_contention_and_handoff() {
    let mut dir = small_dir();
    let mut evq = EventQ::new();

    let a = Rc::new(Access::new(10, 1, 0, 0x100));
    let b = Rc::new(Access::new(20, 1, 0, 0x200));

    assert!(dir.lock(1, 0, EV_RESUME, a.clone()));
    assert_eq!(dir.lock_holder(1, 0), Some(10));

    // contended lock suspends the access
    assert!(!dir.lock(1, 0, EV_RESUME, b.clone()));
    assert_eq!(dir.waiter_count(1, 0), 1);

    // unlock hands off to b: resume event scheduled, lock stays held
    dir.unlock(1, 0, &mut evq);
    assert!(dir.is_locked(1, 0));
    assert_eq!(dir.lock_holder(1, 0), Some(20));
    assert_eq!(dir.waiter_count(1, 0), 0);

    evq.update_time(1);
    let (event, access) = evq.try_fetch().unwrap();
    assert_eq!(event, EV_RESUME);
    assert_eq!(access.id, 20);

    // b finishes; queue is empty, the lock becomes free
    dir.unlock(1, 0, &mut evq);
    assert!(!dir.is_locked(1, 0));
    assert_eq!(dir.lock_holder(1, 0), None);
    assert!(evq.is_empty());
}

#[test]
fn test_waiters_resume_in_fifo_order() {
    let mut dir = small_dir();
    let mut evq = EventQ::new();

    let holder = Rc::new(Access::new(1, 0, 1, 0));
    assert!(dir.lock(0, 1, EV_RESUME, holder));

    let waiters: Vec<Rc<Access>> = (2..=5).map(|i| Rc::new(Access::new(i, 0, 1, 0))).collect();
    for w in &waiters {
        assert!(!dir.lock(0, 1, EV_RESUME, w.clone()));
    }
    assert_eq!(dir.waiter_count(0, 1), 4);

    // one unlock resumes exactly one waiter, in arrival order
    let mut resumed = Vec::new();
    let mut time = 0;
    for _ in 0..4 {
        dir.unlock(0, 1, &mut evq);
        time += 1;
        evq.update_time(time);
        let (_, access) = evq.try_fetch().unwrap();
        assert!(evq.try_fetch().is_none());
        resumed.push(access.id);
        assert!(dir.is_locked(0, 1));
    }
    assert_eq!(resumed, vec![2, 3, 4, 5]);

    // the last resumed waiter's unlock frees the entry
    dir.unlock(0, 1, &mut evq);
    assert!(!dir.is_locked(0, 1));
}

#[test]
fn test_independent_locks_do_not_interact() {
    let mut dir = small_dir();
    let a = Rc::new(Access::new(1, 0, 0, 0));
    let b = Rc::new(Access::new(2, 3, 1, 0));

    assert!(dir.lock(0, 0, EV_RESUME, a));
    assert!(dir.lock(3, 1, EV_RESUME, b));
    assert!(dir.is_locked(0, 0));
    assert!(dir.is_locked(3, 1));
    assert_eq!(dir.lock_holder(3, 1), Some(2));
}

#[test]
fn test_event_q_ordering() {
    let mut evq = EventQ::new();
    let mk = |id| Rc::new(Access::new(id, 0, 0, 0));

    evq.schedule(1, mk(42), 0);
    evq.schedule(1, mk(43), 0);
    evq.schedule(1, mk(44), 1);

    // same timestamp drains in schedule order
    assert_eq!(evq.try_fetch().unwrap().1.id, 42);
    assert_eq!(evq.try_fetch().unwrap().1.id, 43);
    // the later event is not due yet
    assert!(evq.try_fetch().is_none());
    assert!(!evq.is_empty());

    evq.update_time(1);
    assert!(evq.event_available());
    assert_eq!(evq.try_fetch().unwrap().1.id, 44);
    assert!(evq.is_empty());
}

#[test]
fn test_event_q_interleaved_delays() {
    let mut evq = EventQ::new();
    let mk = |id| Rc::new(Access::new(id, 0, 0, 0));

    evq.schedule(1, mk(1), 5);
    evq.schedule(1, mk(2), 1);
    evq.schedule(1, mk(3), 3);
    evq.schedule(1, mk(4), 3);

    let mut order = Vec::new();
    for t in 0..=5 {
        evq.update_time(t);
        while let Some((_, access)) = evq.try_fetch() {
            order.push(access.id);
        }
    }
    assert_eq!(order, vec![2, 3, 4, 1]);
}

#[test]
fn test_boundary_coordinates() {
    let dir = small_dir();
    // the last coordinate in every dimension is valid
    assert_eq!(dir.sharer_count(3, 1, 0), 0);
    assert_eq!(dir.owner(3, 1, 0), None);
}

#[test]
#[should_panic]
fn test_out_of_range_set_rejected() {
    let dir = small_dir();
    dir.owner(4, 0, 0); // xsize itself is out of range
}

#[test]
#[should_panic]
fn test_out_of_range_node_rejected() {
    let mut dir = small_dir();
    dir.add_sharer(0, 0, 0, 8); // num_nodes itself is out of range
}

#[test]
#[should_panic]
fn test_zero_nodes_rejected() {
    Directory::new(
        "bad",
        DirSpec {
            xsize: 1,
            ysize: 1,
            zsize: 1,
            num_nodes: 0,
        },
    );
}

#[test]
#[should_panic(expected = "unlock of unlocked")]
fn test_unlock_of_unlocked_entry() {
    let mut dir = small_dir();
    let mut evq = EventQ::new();
    dir.unlock(0, 0, &mut evq);
}
