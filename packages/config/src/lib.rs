// ABOUTME: Configuration constants for Testdesk
// ABOUTME: Re-exports environment variable names shared by the server and tests

pub mod constants;

pub use constants::*;
