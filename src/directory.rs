// coherence directory: per-block owner, sharer set and statistics
//
// Entries are indexed by (x, y, z) = (set, way, sub-block) and stored in one
// dense array; the per-(set, way) locks live in lock.rs. All mutation of an
// entry's owner/sharer state is expected to happen while the caller holds
// that entry's (set, way) lock -- the data structure does not check this.

use log::{debug, trace};

use crate::commons::DirSpec;
use crate::lock::DirLock;
use crate::sharers::SharerTree;

pub struct DirEntry {
    pub owner: Option<i32>,
    sharers: SharerTree,

    // statistics, monotonic over the entry's lifetime
    pub sharer_adds: u64,    // add attempts, including already-present ones
    pub sharer_removes: u64, // remove attempts, including absent ones
    pub full_invals: u64,    // bulk clears
}

impl DirEntry {
    fn new() -> Self {
        DirEntry {
            owner: None,
            sharers: SharerTree::new(),
            sharer_adds: 0,
            sharer_removes: 0,
            full_invals: 0,
        }
    }
    pub fn num_sharers(&self) -> i32 {
        self.sharers.count()
    }
    pub fn sharers(&self) -> &SharerTree {
        &self.sharers
    }
}

pub struct Directory {
    pub name: String,
    pub spec: DirSpec,
    entries: Vec<DirEntry>,
    pub(crate) locks: Vec<DirLock>,
}

impl Directory {
    pub fn new(name: &str, spec: DirSpec) -> Self {
        assert!(spec.num_nodes > 0);
        assert!(spec.xsize > 0 && spec.ysize > 0 && spec.zsize > 0);
        let entries = (0..spec.num_entries()).map(|_| DirEntry::new()).collect();
        let locks = (0..spec.num_locks()).map(|_| DirLock::new()).collect();
        Directory {
            name: name.into(),
            spec,
            entries,
            locks,
        }
    }

    // dense-array addressing, bounds are fatal

    fn entry_index(&self, x: i32, y: i32, z: i32) -> usize {
        assert!(x >= 0 && x < self.spec.xsize);
        assert!(y >= 0 && y < self.spec.ysize);
        assert!(z >= 0 && z < self.spec.zsize);
        ((x * self.spec.ysize + y) * self.spec.zsize + z) as usize
    }

    pub(crate) fn lock_index(&self, x: i32, y: i32) -> usize {
        assert!(x >= 0 && x < self.spec.xsize);
        assert!(y >= 0 && y < self.spec.ysize);
        (x * self.spec.ysize + y) as usize
    }

    pub fn entry(&self, x: i32, y: i32, z: i32) -> &DirEntry {
        &self.entries[self.entry_index(x, y, z)]
    }

    fn entry_mut(&mut self, x: i32, y: i32, z: i32) -> &mut DirEntry {
        let i = self.entry_index(x, y, z);
        &mut self.entries[i]
    }

    // owner

    pub fn owner(&self, x: i32, y: i32, z: i32) -> Option<i32> {
        self.entry(x, y, z).owner
    }

    pub fn set_owner(&mut self, x: i32, y: i32, z: i32, node: Option<i32>) {
        if let Some(n) = node {
            assert!(n >= 0 && n < self.spec.num_nodes);
        }
        self.entry_mut(x, y, z).owner = node;
        trace!(target: "mem",
            "mem.set_owner dir=\"{}\" x={} y={} z={} owner={}",
            self.name, x, y, z, node.unwrap_or(-1));
    }

    // sharers

    pub fn add_sharer(&mut self, x: i32, y: i32, z: i32, node: i32) {
        assert!(node >= 0 && node < self.spec.num_nodes);
        let num_nodes = self.spec.num_nodes;
        let entry = self.entry_mut(x, y, z);
        entry.sharer_adds += 1;
        if !entry.sharers.insert(node) {
            // already a sharer
            return;
        }
        assert!(entry.sharers.count() <= num_nodes);
        trace!(target: "mem",
            "mem.set_sharer dir=\"{}\" x={} y={} z={} sharer={}",
            self.name, x, y, z, node);
    }

    pub fn remove_sharer(&mut self, x: i32, y: i32, z: i32, node: i32) {
        assert!(node >= 0 && node < self.spec.num_nodes);
        let entry = self.entry_mut(x, y, z);
        entry.sharer_removes += 1;
        if !entry.sharers.remove(node) {
            // not a sharer
            return;
        }
        assert!(entry.sharers.count() >= 0);
        trace!(target: "mem",
            "mem.clear_sharer dir=\"{}\" x={} y={} z={} sharer={}",
            self.name, x, y, z, node);
    }

    pub fn clear_all_sharers(&mut self, x: i32, y: i32, z: i32) {
        let entry = self.entry_mut(x, y, z);
        entry.full_invals += 1;
        entry.sharers.clear();
        trace!(target: "mem",
            "mem.clear_all_sharers dir=\"{}\" x={} y={} z={}",
            self.name, x, y, z);
    }

    pub fn is_sharer(&self, x: i32, y: i32, z: i32, node: i32) -> bool {
        assert!(node >= 0 && node < self.spec.num_nodes);
        self.entry(x, y, z).sharers.contains(node)
    }

    pub fn sharer_count(&self, x: i32, y: i32, z: i32) -> i32 {
        self.entry(x, y, z).sharers.count()
    }

    /// true if any sub-block at (x, y) has sharers or a valid owner
    pub fn group_shared_or_owned(&self, x: i32, y: i32) -> bool {
        for z in 0..self.spec.zsize {
            let entry = self.entry(x, y, z);
            if entry.sharers.count() > 0 || entry.owner.is_some() {
                return true;
            }
        }
        false
    }

    pub fn dump_sharers(&self, x: i32, y: i32, z: i32) {
        let entry = self.entry(x, y, z);
        let members: Vec<String> = entry
            .sharers
            .members()
            .iter()
            .map(|n| n.to_string())
            .collect();
        debug!("  {} sharers: {{ {} }}", entry.sharers.count(), members.join(" "));
    }

    /// Run the sharer-tree cleanup pass over every entry, reclaiming
    /// tombstoned tree nodes. Cadence is up to the caller.
    pub fn compact_sharers(&mut self) {
        for entry in &mut self.entries {
            entry.sharers.compact();
        }
    }
}
