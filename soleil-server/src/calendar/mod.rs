//! Business-day calendar logic

pub mod availability;

pub use availability::{DayStatus, resolve};
