pub mod bounds;
pub mod job_timer;
pub mod position;

pub use bounds::Bounds;
pub use job_timer::{JobTimer, WorkSummary};
pub use position::{Position, MAX_Z};

use ahash::AHashMap;
pub type SmallKeyHashMap<K, V> = AHashMap<K, V>;

// Re-exports.
pub use static_assertions;
