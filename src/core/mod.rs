//! Core module containing fundamental data structures and traits
//!
//! This module provides the foundation for the sync engine: submission and
//! repository data, the language classifier and the collaborator traits.

pub mod data;
pub mod language;
pub mod traits;
