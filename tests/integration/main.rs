//! Integration tests

mod config_test;
mod cycle_test;
