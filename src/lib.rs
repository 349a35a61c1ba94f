//! supplynet: supplier network manager
//!
//! Factories supply retail chains, retail chains supply sole proprietors.
//! Every supplier link is checked for cycles and depth before it is saved.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
