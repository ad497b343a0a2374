//! Agent roles
//!
//! The network is made of a fixed, closed set of [`Role`]s. This module also
//! defines the fixed groupings (factions) the governance hooks refer to and
//! the alias table used to resolve role names in judicial rulings.

pub mod entities;
pub mod factions;

pub use entities::Role;
