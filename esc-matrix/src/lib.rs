//! Analog scanning engine for electrostatic capacitive (EC) keyboards.
//!
//! EC switches do not close a contact. Each switch is a small capacitor
//! whose coupling rises as the key travels down, so the matrix is read by
//! charging one switch at a time and sampling the result with an ADC.
//!
//! One dimension of the matrix is selected through an analog multiplexer
//! (up to 16 units behind 1-4 address lines), the other is wired to
//! individual sense lines. A shared drain line discharges the sensor between
//! samples. Instead of a debounce pass, each switch is compared against two
//! thresholds: a higher one to latch and a lower one to unlatch.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool. The `std` feature (on by default) adds
//! `std::error::Error` impls and exports the `mock` bench. Unit tests always
//! build against `std` and the bench.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

use core::convert::Infallible;

pub mod config;
pub mod hal;
pub mod hooks;
pub mod matrix;
pub mod mux;
pub mod print;
pub mod scan;
pub mod state;
pub mod strobe;

#[cfg(any(test, feature = "std"))]
pub mod mock;

pub use config::{ConfigError, Thresholds};
pub use hal::{AnalogSense, DrainLine};
pub use hooks::{MatrixHooks, NoHooks};
pub use matrix::AnalogMatrix;
pub use mux::MuxAddress;
pub use scan::{ColumnMajor, RowMajor, ScanOrder, Topology};
pub use state::{MatrixState, RowBits};
pub use strobe::AnalogStrobe;

/// Unwrap the result of a pin operation that cannot fail.
#[inline(always)]
pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
