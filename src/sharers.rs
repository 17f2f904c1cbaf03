// sharer set of a directory entry, kept as a binary search tree with lazy
// deletion
//
// A bitmap over all nodes costs O(num_nodes) memory per entry even when the
// set is empty; the tree only pays for actual members. Removal just marks a
// node invalid, so ids that toggle membership repeatedly never reallocate;
// compact() reclaims tombstoned nodes in bulk when the caller decides to.

struct TreeNode {
    value: i32,
    valid: bool,
    // arena indices, parent is a back-reference used during deletion
    parent: Option<usize>,
    lc: Option<usize>,
    rc: Option<usize>,
}

pub struct SharerTree {
    nodes: Vec<TreeNode>,
    root: Option<usize>,
    free: Vec<usize>,   // recycled arena slots
    count: i32,         // valid members
}

impl SharerTree {
    pub fn new() -> Self {
        SharerTree {
            nodes: Vec::new(),
            root: None,
            free: Vec::new(),
            count: 0,
        }
    }

    /// number of active members
    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn contains(&self, value: i32) -> bool {
        let mut cur = self.root;
        while let Some(i) = cur {
            let node = &self.nodes[i];
            if value == node.value {
                return node.valid;
            }
            cur = if value < node.value { node.lc } else { node.rc };
        }
        false
    }

    /// Add `value` to the set. Idempotent; a tombstoned slot for the same
    /// value is revalidated in place. Returns whether membership changed.
    pub fn insert(&mut self, value: i32) -> bool {
        let Some(mut cur) = self.root else {
            let i = self.alloc(value, None);
            self.root = Some(i);
            self.count += 1;
            return true;
        };
        loop {
            let cur_value = self.nodes[cur].value;
            if value == cur_value {
                if self.nodes[cur].valid {
                    return false;
                }
                self.nodes[cur].valid = true;
                self.count += 1;
                return true;
            }
            let child = if value < cur_value {
                self.nodes[cur].lc
            } else {
                self.nodes[cur].rc
            };
            match child {
                Some(c) => cur = c,
                None => {
                    let i = self.alloc(value, Some(cur));
                    if value < cur_value {
                        self.nodes[cur].lc = Some(i);
                    } else {
                        self.nodes[cur].rc = Some(i);
                    }
                    self.count += 1;
                    return true;
                }
            }
        }
    }

    /// Mark `value` as removed. The node stays in the arena until the next
    /// compact(). Removing an absent value is a no-op returning false, so a
    /// caller that requires presence can assert on the result.
    pub fn remove(&mut self, value: i32) -> bool {
        let mut cur = self.root;
        while let Some(i) = cur {
            let node = &mut self.nodes[i];
            if value == node.value {
                if !node.valid {
                    return false;
                }
                node.valid = false;
                self.count -= 1;
                return true;
            }
            cur = if value < node.value { node.lc } else { node.rc };
        }
        false
    }

    /// Drop every member and every tombstone at once.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.count = 0;
    }

    /// Physically reclaim tombstoned nodes. Never invoked implicitly; the
    /// caller picks a cadence that bounds worst-case arena growth for its
    /// workload.
    pub fn compact(&mut self) {
        if let Some(root) = self.root {
            self.compact_subtree(root);
        }
    }

    /// active members in ascending order
    pub fn members(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.count as usize);
        self.collect_members(self.root, &mut out);
        out
    }

    // arena slot management

    fn alloc(&mut self, value: i32, parent: Option<usize>) -> usize {
        let node = TreeNode {
            value,
            valid: true,
            parent,
            lc: None,
            rc: None,
        };
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = node;
                i
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, i: usize) {
        self.free.push(i);
    }

    // physical deletion

    fn compact_subtree(&mut self, i: usize) {
        // children first; deletions inside a subtree re-link through the
        // parent back-references, so re-reading the child links is safe
        if let Some(lc) = self.nodes[i].lc {
            self.compact_subtree(lc);
        }
        if let Some(rc) = self.nodes[i].rc {
            self.compact_subtree(rc);
        }
        if !self.nodes[i].valid {
            self.delete_node(i);
        }
    }

    fn delete_node(&mut self, i: usize) {
        match (self.nodes[i].lc, self.nodes[i].rc) {
            (Some(_), Some(rc)) => {
                // two children: take over the in-order successor's payload
                // (value and validity), then delete the successor's slot,
                // which has no left child by construction
                let succ = self.find_min(rc);
                self.nodes[i].value = self.nodes[succ].value;
                self.nodes[i].valid = self.nodes[succ].valid;
                self.delete_node(succ);
            }
            (Some(c), None) | (None, Some(c)) => {
                self.replace_in_parent(i, Some(c));
                self.release(i);
            }
            (None, None) => {
                self.replace_in_parent(i, None);
                self.release(i);
            }
        }
    }

    fn replace_in_parent(&mut self, i: usize, new: Option<usize>) {
        let parent = self.nodes[i].parent;
        match parent {
            Some(p) => {
                if self.nodes[p].lc == Some(i) {
                    self.nodes[p].lc = new;
                } else {
                    self.nodes[p].rc = new;
                }
            }
            None => self.root = new,
        }
        if let Some(n) = new {
            self.nodes[n].parent = parent;
        }
    }

    fn find_min(&self, mut i: usize) -> usize {
        while let Some(lc) = self.nodes[i].lc {
            i = lc;
        }
        i
    }

    fn collect_members(&self, cur: Option<usize>, out: &mut Vec<i32>) {
        if let Some(i) = cur {
            self.collect_members(self.nodes[i].lc, out);
            if self.nodes[i].valid {
                out.push(self.nodes[i].value);
            }
            self.collect_members(self.nodes[i].rc, out);
        }
    }
}

impl Default for SharerTree {
    fn default() -> Self {
        SharerTree::new()
    }
}
