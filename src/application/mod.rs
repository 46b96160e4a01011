//! Application ports and errors shared by the purge engine and its adapters.

pub mod cdn;
pub mod error;
pub mod repos;
