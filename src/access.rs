// in-flight memory accesses

/// An in-flight access suspended on a directory entry lock. The directory
/// only ever holds `Rc` clones of these while the access sits in a lock
/// queue; the request-tracking side keeps ownership.
pub struct Access {
    pub id: u64,    // unique per access, printed as "A-<id>"
    pub set: i32,   // target (set, way) of the blocking lock
    pub way: i32,
    pub tag: i32,   // block tag, only used in debug output
}

impl Access {
    pub fn new(id: u64, set: i32, way: i32, tag: i32) -> Self {
        Access { id, set, way, tag }
    }
}
