/// Image processing services
///
/// Storage seam, variant generation and the per-object pipeline tying them together.
pub mod pipeline;
pub mod storage;
pub mod variants;

pub use pipeline::ImagePipeline;
pub use storage::{FetchedObject, InMemoryObjectStore, ObjectStore};
