#![cfg_attr(not(any(test, feature = "hosted")), no_std)]

pub mod allocator;
pub mod fault;
#[cfg(feature = "hosted")]
pub mod hosted;
pub mod panic;
pub mod platform;
pub mod sink;

#[cfg(test)]
mod mock;
