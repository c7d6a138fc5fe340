//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;
