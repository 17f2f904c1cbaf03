// directory geometry

pub struct DirSpec {
    pub xsize: i32,     // cache sets
    pub ysize: i32,     // ways per set
    pub zsize: i32,     // sub-blocks per block
    pub num_nodes: i32, // sharing nodes, ids in [0, num_nodes)
}

impl Default for DirSpec {
    fn default() -> Self {
        DirSpec {
            xsize: 64,      // sets
            ysize: 4,       // ways
            zsize: 1,       // sub-blocks
            num_nodes: 16,  // nodes
        }
    }
}

impl DirSpec {
    pub fn num_entries(&self) -> usize {
        (self.xsize * self.ysize * self.zsize) as usize
    }
    pub fn num_locks(&self) -> usize {
        (self.xsize * self.ysize) as usize
    }
}
