pub mod serve;
pub mod summary;
