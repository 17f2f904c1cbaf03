pub mod access;
pub mod commons;
pub mod directory;
pub mod event_q;
pub mod lock;
pub mod sharers;

pub use access::Access;
pub use commons::DirSpec;
pub use directory::{DirEntry, Directory};
pub use event_q::{EventId, EventQ, EventScheduler};
pub use sharers::SharerTree;
