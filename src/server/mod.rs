//! Accept loop and worker supervision.

pub mod listener;
pub mod shutdown;
