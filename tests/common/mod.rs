//! Common test utilities and helpers
//!
//! Shared by the integration tests: a recording stand-in for the git command
//! layer and fixtures for input files and working directories.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;
