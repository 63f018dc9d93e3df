//! Stable content fingerprints for pipeline configurations.
//!
//! Two independently seeded FNV-1a streams are folded over the canonical
//! form of the configuration (object keys visited in sorted order), so
//! the fingerprint depends only on content, never on key insertion order.

use serde_json::Value;

/// Stable fingerprint of a pipeline configuration, used as the compile
/// cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineFingerprint {
    /// First hash stream.
    pub hi: u64,
    /// Second hash stream.
    pub lo: u64,
}

/// Fingerprint an arbitrary JSON value.
pub fn fingerprint_value(v: &Value) -> PipelineFingerprint {
    let mut a = Fnv1a64::new(0xcbf29ce484222325);
    let mut b = Fnv1a64::new(0x9ae16a3b2f90404f);
    write_json_value_pair(&mut a, &mut b, v);
    PipelineFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn write_json_value_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: &Value) {
    match v {
        Value::Null => write_u8_pair(a, b, 0),
        Value::Bool(x) => {
            write_u8_pair(a, b, 1);
            write_u8_pair(a, b, u8::from(*x));
        }
        Value::Number(n) => {
            write_u8_pair(a, b, 2);
            write_str_pair(a, b, &n.to_string());
        }
        Value::String(s) => {
            write_u8_pair(a, b, 3);
            write_str_pair(a, b, s);
        }
        Value::Array(items) => {
            write_u8_pair(a, b, 4);
            write_u64_pair(a, b, items.len() as u64);
            for item in items {
                write_json_value_pair(a, b, item);
            }
        }
        Value::Object(map) => {
            write_u8_pair(a, b, 5);
            let mut keys = map.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            write_u64_pair(a, b, keys.len() as u64);
            for k in keys {
                write_str_pair(a, b, &k);
                write_json_value_pair(a, b, &map[&k]);
            }
        }
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.0 = h;
    }

    fn finish(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/fingerprint.rs"]
mod tests;
