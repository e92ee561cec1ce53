//! Nudelta: keymap utility for the NuPhy Air60
//!
//! The binary is a thin shell over this library. Device work lives in the
//! `nudelta-transport` and `nudelta-keyboard` crates; this crate adds the
//! settings file, the HID access check and the file-backed operations the
//! command line exposes.

pub mod access;
pub mod config;
pub mod operations;

pub use config::Settings;
