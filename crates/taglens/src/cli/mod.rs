//! Command implementations.

pub mod config;
pub mod corpus;
pub mod run;
pub mod serve;
