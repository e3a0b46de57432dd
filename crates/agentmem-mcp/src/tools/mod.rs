pub mod memory;

pub use memory::{memory_tools, MemoryContext, MemoryGetTool, MemorySearchTool, MemoryWriteTool};
