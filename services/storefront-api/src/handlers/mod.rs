//! REST API handlers

pub mod bookings;
pub mod health;
pub mod purchases;
pub mod shared;
pub mod subscription;

pub use bookings::*;
pub use health::*;
pub use purchases::*;
pub use subscription::*;
