// src/lib.rs — Library root for qarelay

pub mod cli;
pub mod core;
pub mod infra;
pub mod provider;
