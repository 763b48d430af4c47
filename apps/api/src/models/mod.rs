pub mod job;
pub mod raw;
