// src/core/tasks/mod.rs

//! Long-running background tasks that keep the service's state fresh.

pub mod refill;
