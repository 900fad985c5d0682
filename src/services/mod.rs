pub mod backend;
pub mod storage;
