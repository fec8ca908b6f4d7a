//! Integration tests for the gateway control plane.

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod generator_tests;
#[cfg(test)]
mod manager_tests;
