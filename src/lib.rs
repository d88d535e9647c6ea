//! Library exports for the SBP redirect gateway
//!
//! This module exposes internal components for testing and potential library usage.

pub mod database;
pub mod error;
pub mod handler;
pub mod hours;
pub mod middleware;
pub mod model;
pub mod route;
pub mod rules;
pub mod session;
