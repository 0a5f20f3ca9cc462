pub mod sampler;
pub mod supervise;
pub mod terminate;

pub use sampler::MemorySampler;
pub use supervise::supervise;
pub use terminate::{terminate, KillReport};
