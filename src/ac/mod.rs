pub mod permissions;

pub use permissions::{Capabilities, Role};
