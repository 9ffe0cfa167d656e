#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};
use sweetjson::{Parser, ParserOptions, SyntaxError};

/// One flag byte: the low three bits pick a depth limit (0 = unlimited).
const HEADER: usize = 1;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b"\x0c"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);

        let mut prefix = HEADER;
        let limit = max_size - prefix;
        prefix += append_whitespace(&mut data[prefix..], limit);
        let limit = max_size - prefix;
        prefix += append_document(&mut data[prefix..], size.max(8), limit);
        let limit = max_size - prefix;
        prefix += append_whitespace(&mut data[prefix..], limit);
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }

        let n = rng.random_range(0..=limit.min(4));
        let mut written = 0;
        for _ in 0..n {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

/// Writes a serialized array or object root, truncated to `limit`.
fn append_document(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value.0;
        }
    };
    let root = match value {
        root @ (Value::Array(_) | Value::Object(_)) => root,
        other => Value::Array(vec![other]),
    };

    let serialized = serde_json::to_vec(&root).expect("serializing a serde_json::Value cannot fail");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

/// Converts a reference tree, or `None` if it holds something this parser
/// rejects by design (scalar roots aside): an empty object key.
fn expected_tree(value: &Value) -> Option<sweetjson::Value> {
    Some(match value {
        Value::Null => sweetjson::Value::Null,
        Value::Bool(b) => sweetjson::Value::Boolean(*b),
        Value::Number(n) => sweetjson::Value::Number(n.as_f64()?),
        Value::String(s) => sweetjson::Value::String(s.clone()),
        Value::Array(items) => sweetjson::Value::Array(items.iter().map(expected_tree).collect::<Option<_>>()?),
        Value::Object(map) => sweetjson::Value::Object(
            map.iter()
                .map(|(k, v)| if k.is_empty() { None } else { Some((k.clone(), expected_tree(v)?)) })
                .collect::<Option<_>>()?,
        ),
    })
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let max_depth = match data[0] & 7 {
        0 => None,
        n => Some(usize::from(n)),
    };
    let data = &data[HEADER..];
    let parser = Parser::new(ParserOptions {
        max_depth,
        ..ParserOptions::default()
    });

    let first = parser.parse_slice(data);
    assert_eq!(first, parser.parse_slice(data), "parsing must be deterministic");

    // Surrogate pairs are combined by the reference but not here, and the
    // reference also accepts an escaped solidus.
    if data.windows(2).any(|w| w == b"\\u" || w == b"\\/") {
        return;
    }
    let Ok(reference) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    if !(reference.is_array() || reference.is_object()) {
        return;
    }
    let Some(expected) = expected_tree(&reference) else {
        return;
    };

    match first {
        Ok(value) => assert_eq!(value, expected),
        Err(err) => assert!(
            matches!(err.syntax_error(), Some(SyntaxError::DepthLimitExceeded(_))),
            "rejected a document the reference accepts: {err}"
        ),
    }
}

fuzz_target!(|data: &[u8]| parser(data));
