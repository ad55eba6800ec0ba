//! The HTTP surface: one submodule per resource, JSON in and out. Every
//! response body carries the `{success: bool, ...}` envelope; errors get
//! theirs from [`crate::fallible::Error`].

pub mod appointments;
pub mod auth;
pub mod patients;
pub mod users;
