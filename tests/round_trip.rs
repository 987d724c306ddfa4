//! Round-trip properties: `parse(print(parse(I)))` is structurally equal to
//! `parse(I)`, for a representative sample of inputs across every value
//! shape this crate understands.

#[path = "../demos/print.rs"]
mod print;

use edn_reader::{parse, value_equal};

fn assert_round_trips(input: &[u8]) {
    let first = parse(input).expect("input parses");
    let printed = print::print(first.root());
    let second = parse(printed.as_bytes())
        .unwrap_or_else(|e| panic!("printed form {printed:?} failed to reparse: {e:?}"));
    assert!(
        value_equal(first.root(), second.root()),
        "round trip mismatch: {input:?} -> {printed:?}"
    );
}

#[test]
fn scalars_round_trip() {
    assert_round_trips(b"nil");
    assert_round_trips(b"true");
    assert_round_trips(b"false");
    assert_round_trips(b"42");
    assert_round_trips(b"-17");
    assert_round_trips(b"3.14");
    assert_round_trips(b"1.0e10");
    assert_round_trips(br#""a plain string""#);
    assert_round_trips(b"\\a");
    assert_round_trips(b"\\newline");
    assert_round_trips(b"foo/bar");
    assert_round_trips(b":a-keyword");
    assert_round_trips(b":ns/qualified");
}

#[test]
fn extended_numerics_round_trip() {
    assert_round_trips(b"22/7");
    assert_round_trips(b"9223372036854775808");
    assert_round_trips(b"9223372036854775807N");
    assert_round_trips(b"##NaN");
    assert_round_trips(b"##Inf");
    assert_round_trips(b"##-Inf");
}

#[test]
fn collections_round_trip() {
    assert_round_trips(b"(1 2 3)");
    assert_round_trips(b"[1 2 3]");
    assert_round_trips(b"#{1 2 3}");
    assert_round_trips(b"{:a 1 :b 2}");
    assert_round_trips(b"[[1 2] [3 [4 5]] {}]");
}

#[test]
fn tagged_literals_round_trip() {
    assert_round_trips(br#"#inst "2024-01-01""#);
    assert_round_trips(b"#myapp/point {:x 1 :y 2}");
}

#[test]
fn strings_with_escapes_round_trip() {
    assert_round_trips(br#""hello\nworld""#);
    assert_round_trips(br#""tab\there""#);
}

#[test]
fn nan_compares_equal_to_itself_under_structural_equality() {
    let a = parse(b"##NaN").unwrap();
    let b = parse(b"##NaN").unwrap();
    assert!(value_equal(a.root(), b.root()));
}
