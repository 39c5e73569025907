//! Compile-time selection between the hosted and freestanding defaults.

/// `true` when built with the `hosted` feature (operating system and `std`).
pub const HOSTED: bool = cfg!(feature = "hosted");

#[cfg(feature = "hosted")]
pub type PlatformSink = crate::hosted::ConsoleSink;

#[cfg(not(feature = "hosted"))]
pub type PlatformSink = crate::sink::NullSink;

/// The platform's default diagnostic output: stdout when hosted, a sink that
/// drops everything otherwise. Freestanding integrators pass their own
/// serial or console sink explicitly.
pub fn default_sink() -> PlatformSink {
    PlatformSink::default()
}
