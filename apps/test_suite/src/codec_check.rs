use codec::{
    bytes_to_hex, format_f64, format_i64, format_radix, hex_to_bytes, parse_f64, parse_i64, parse_u64,
    INTEGER_TEXT_LEN,
};
use system::dprintln;
use system::sink::DiagnosticSink;

use crate::random::SimpleRng;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub passed: usize,
    pub failed: usize,
}

impl CheckReport {
    fn record(&mut self, sink: &mut dyn DiagnosticSink, ok: bool, what: &str) {
        if ok {
            self.passed += 1;
        } else {
            self.failed += 1;
            dprintln!(sink, "[Codec] [FAIL] {}", what);
        }
    }
}

const FLOAT_CASES: [(f64, usize, &str); 10] = [
    (1.0 / 16.0, 4, "0.0625"),
    (-600.0 / 32.0, 2, "-18.75"),
    (f64::NAN, 10, "nan"),
    (f64::INFINITY, 2, "inf"),
    (f64::NEG_INFINITY, 2, "-inf"),
    (1.0e20, 2, "big"),
    (1.0e-9, 3, "wee"),
    (0.0, 3, "0.000"),
    (2.5, 0, "3"),
    (123.456, 1, "123.5"),
];

/// Renders a fixed table of floats and round-trips random integers through
/// every radix, reporting each mismatch through `sink`.
pub fn run(sink: &mut dyn DiagnosticSink, seed: u32, rounds: usize) -> CheckReport {
    let mut report = CheckReport::default();
    dprintln!(sink, "[Codec] Checking float rendering and {} integer rounds...", rounds);

    for (value, digits, expected) in FLOAT_CASES {
        let mut out = [0u8; 48];
        let text = format_f64(value, &mut out, digits);
        dprintln!(sink, "[Codec] format_f64({}, {}) = {}", value, digits, text.unwrap_or("<none>"));
        report.record(sink, text == Some(expected), expected);
    }

    let mut narrow = [0u8; 2];
    report.record(sink, format_f64(-2.0, &mut narrow, 1).is_none(), "-2.0 in two bytes");

    let mut rng = SimpleRng::new(seed);
    for _ in 0..rounds {
        let value = ((rng.next() as u64) << 32) | rng.next() as u64;
        let radix = rng.next_range(2, 36) as u32;
        let mut out = [0u8; 66];
        let round_trip = format_radix(value, radix, &mut out).map(|text| parse_u64(text.as_bytes(), radix).value);
        report.record(sink, round_trip == Some(value), "unsigned radix round trip");

        let signed = value as i64;
        let mut out = [0u8; INTEGER_TEXT_LEN];
        let round_trip = format_i64(signed, &mut out).map(|text| parse_i64(text.as_bytes(), 10).value);
        report.record(sink, round_trip == Some(signed), "signed decimal round trip");

        let bytes = value.to_le_bytes();
        let mut text = [0u8; 19];
        let mut decoded = [0u8; 8];
        let hex_ok = bytes_to_hex(&bytes, &mut text, true)
            .and_then(|hex| hex_to_bytes(hex.as_bytes(), &mut decoded))
            .is_some_and(|back| back == bytes);
        report.record(sink, hex_ok, "hex round trip");

        let float = (value >> 32) as f64 / 1024.0;
        let mut out = [0u8; 48];
        let parsed = format_f64(float, &mut out, 3).map(|text| parse_f64(text.as_bytes()).value);
        let close = parsed.is_some_and(|back| back - float <= 5.01e-4 && float - back <= 5.01e-4);
        report.record(sink, close, "float text round trip");
    }

    if report.failed == 0 {
        dprintln!(sink, "[Codec] [PASS] {} checks", report.passed);
    } else {
        dprintln!(sink, "[Codec] [FAIL] {} of {} checks", report.failed, report.passed + report.failed);
    }
    report
}
