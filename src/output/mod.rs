//! Output formatting for the binary.
//!
//! - [`terminal`] - coloured status summary

mod terminal;

pub use terminal::{format_field, print_status, status_summary};
