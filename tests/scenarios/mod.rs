//! Scenario-based tests for simrun

mod configuration_errors;
mod failure_handling;
mod success_chain;
