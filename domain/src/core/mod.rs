//! Core identity types shared by every other domain module.

pub mod identifier;
pub mod string;

pub use identifier::{EntityDomain, Identifier, UserId};
pub use string::truncate_label;
