pub mod dedup;
pub mod policy;
pub mod signals;

pub use dedup::DedupService;
