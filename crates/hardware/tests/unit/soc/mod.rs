//! # System-on-Chip Tests
//!
//! Tests for the protocol engine components and their composition.

/// Configuration derivation and validation.
pub mod timing;

/// Controller reset sequencing and FSM behaviour.
pub mod controller;



/// Device profile table.
pub mod devices;


/// CSR-driven register access.
pub mod register_space;
