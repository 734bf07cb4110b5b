#![warn(missing_docs)]

//! Error types for the motion library.
//!
//! This module defines error types that can occur while integrating
//! agent motion between waypoints.

use core::fmt;

/// Errors that can occur in motion calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Error for a negative time delta.
    /// This variant is returned when a negative time delta is used for a motion step.
    NegativeTimeDelta(&'static str),
    /// Error for an invalid speed.
    /// This variant is returned when a speed is negative or not finite.
    InvalidSpeed(&'static str),
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
            MotionError::InvalidSpeed(msg) => write!(f, "Invalid speed: {}", msg),
        }
    }
}

impl core::error::Error for MotionError {}
