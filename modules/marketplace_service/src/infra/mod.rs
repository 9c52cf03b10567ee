//! Infrastructure adapters

pub mod identity;
pub mod storage;
