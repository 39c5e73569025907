//! Numeric text codecs that work without `core::fmt`.
//!
//! Every writer renders into a caller-supplied byte buffer, never writes past
//! its end, terminates the text with a NUL byte and hands back the written
//! text as a `&str` borrowed from that buffer. `None` means the rendering did
//! not fit.
//!
//! ```text
//!   out: [ '-' '1' '8' '.' '7' '5' 0x00  ?  ? ]
//!          └──────── returned ───────┘ └ terminator
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate lazy_static;

mod cursor;
pub mod float;
pub mod hex;
pub mod integer;
pub mod parse;
mod tables;

pub use float::{format_f64, parse_f64, MAX_FRACTION_DIGITS};
pub use hex::{bytes_to_hex, hex_to_bytes, word_to_hex, WORD_HEX_LEN};
pub use integer::{format_i64, format_radix, format_u64};
pub use parse::{parse_i64, parse_u64, Parsed};

/// Buffer size that fits any `u64`/`i64` in decimal, sign and terminator included.
pub const INTEGER_TEXT_LEN: usize = 22;
