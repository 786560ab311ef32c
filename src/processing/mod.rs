//! Decision logic shared by projection and reconstruction.
//!
//! - [`availability_set`] - whether the primary availability set must exist,
//!   and its domain counts

mod availability_set;

pub use availability_set::{find_domain_counts, is_primary_availability_set_required, DomainCounts};
