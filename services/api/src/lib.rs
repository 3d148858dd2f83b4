//! services/api/src/lib.rs
//!
//! The Brigo backend: REST endpoints for notebooks, materials and accounts.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
