use std::rc::Rc;
use std::time::Instant;

use env_logger::Env;

use cohdir_rs::{Access, DirSpec, Directory, EventQ};

const EV_RETRY_ACCESS: i32 = 1;

fn main() {
    // logging
    let env = Env::default()
        .filter_or("MY_LOG_LEVEL", "trace")
        .write_style_or("MY_LOG_STYLE", "always");
    env_logger::init_from_env(env);

    let mut dir = Directory::new(
        "l2-dir",
        DirSpec {
            xsize: 64,
            ysize: 4,
            zsize: 2,
            num_nodes: 8,
        },
    );
    let mut evq = EventQ::new();

    // a handful of accesses all fighting for the same (set, way)
    let accesses: Vec<Rc<Access>> = (0..4)
        .map(|i| Rc::new(Access::new(i, 3, 1, 0x40 + i as i32)))
        .collect();

    let t0 = Instant::now();

    // the first access wins the lock, the rest suspend in the waiter queue
    let mut suspended = 0;
    for a in &accesses {
        if !dir.lock(3, 1, EV_RETRY_ACCESS, a.clone()) {
            suspended += 1;
        }
    }
    println!("{} accesses suspended on (3,1)", suspended);

    // the holder runs its critical section and releases, handing off to the
    // head of the queue
    let head = &accesses[0];
    dir.add_sharer(head.set, head.way, 0, head.id as i32);
    dir.set_owner(head.set, head.way, 0, Some(head.id as i32));
    dir.unlock(3, 1, &mut evq);

    // drive the event queue until every suspended access has been resumed
    // and run its turn in the critical section
    let mut cycle = 0;
    while !evq.is_empty() {
        cycle += 1;
        evq.update_time(cycle);
        while let Some((_event, access)) = evq.try_fetch() {
            // resumed waiter already holds the lock (hand-off)
            dir.add_sharer(access.set, access.way, 0, access.id as i32);
            dir.set_owner(access.set, access.way, 0, Some(access.id as i32));
            dir.unlock(access.set, access.way, &mut evq);
        }
    }
    let t1 = Instant::now();

    dir.dump_sharers(3, 1, 0);
    dir.clear_all_sharers(3, 1, 0);
    dir.set_owner(3, 1, 0, None);
    dir.compact_sharers();

    let entry = dir.entry(3, 1, 0);
    println!("finished in {} cycles", cycle);
    println!(
        "entry (3,1,0): {} sharer adds, {} removes, {} full invalidations",
        entry.sharer_adds, entry.sharer_removes, entry.full_invals
    );
    println!("execution time {:?}", t1 - t0);
}
