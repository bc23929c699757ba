#![no_std]

//! # soilnode-rs
//! ## An irrigation and climate monitoring node in Rust
//!
//! Features:
//! - DHT11 temperature/humidity decoding over a single bidirectional line
//! - Interrupt-driven soil moisture sampling with a free-running ADC
//! - Threshold-based pump control (active-low relay)
//! - Two LCD views multiplexed on a one second tick schedule
//!
//! Everything in this library is hardware-independent; the firmware binary
//! owns the RP2040 bring-up and the interrupt handlers.

pub mod dht11;
pub mod display;
pub mod moisture;
pub mod shared;
pub mod timer;
