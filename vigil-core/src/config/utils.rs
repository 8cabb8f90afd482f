//! Configuration utility functions
//!
//! This module provides helper functions for working with
//! environment variables and configuration values.

/// Get a string value from an environment variable or use the default
pub fn get_env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a comma-separated list from an environment variable or use the default
pub fn get_env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(val) => val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Get a f64 value from an environment variable or use the default
pub fn get_env_f64(key: &str, default: f64) -> f64 {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get a u32 value from an environment variable or use the default
pub fn get_env_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get a u64 value from an environment variable or use the default
pub fn get_env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get a usize value from an environment variable or use the default
pub fn get_env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}
