//! Core types for Lotkeeper.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod plate;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use plate::{PlateError, PlateNumber};
pub use status::*;
