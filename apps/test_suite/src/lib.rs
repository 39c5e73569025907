//! Self-tests that run unchanged on every platform: an allocation stress
//! workload for any [`Allocator`](system::allocator::Allocator) and a codec
//! check, both reporting through a diagnostic sink.

#![cfg_attr(not(test), no_std)]

pub mod codec_check;
mod random;
pub mod stress;

pub use codec_check::CheckReport;
pub use random::SimpleRng;
pub use stress::{StressConfig, StressReport, MAX_LIVE};
