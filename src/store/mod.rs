pub mod disk;
pub mod memory;

pub use disk::DiskQuoteStore;
pub use memory::MemoryQuoteStore;
