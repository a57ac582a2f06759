pub mod gen_arena;
pub mod indexed_heap;
pub mod multi_map;

pub use gen_arena::{GenArena, Handle};
pub use indexed_heap::{HeapAdapter, IndexedMinHeap, NOT_IN_PARTITION};
pub use multi_map::MultiMap;
