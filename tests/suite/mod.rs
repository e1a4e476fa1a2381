//! Integration test suite modules

mod config;
mod lookup;
mod submission;
