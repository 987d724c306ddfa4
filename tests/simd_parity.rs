//! Black-box correctness checks for inputs sized around the vector
//! scanners' short-input guard and 16-byte chunk boundaries. The scalar vs.
//! specialized parity tests themselves live beside each scanner in
//! `src/simd/*.rs`; this suite instead drives the whole parser across
//! those same length boundaries through the public API, so a regression in
//! how a scanner's result is consumed (not just the scan itself) would
//! still be caught.

use edn_reader::parse;

fn vector_of_len(n: usize) -> Vec<u8> {
    let mut s = Vec::with_capacity(n + 2);
    s.push(b'[');
    for i in 0..n {
        if i > 0 {
            s.push(b' ');
        }
        s.push(b'1');
    }
    s.push(b']');
    s
}

#[test]
fn whitespace_runs_around_chunk_boundaries_parse_correctly() {
    for pad in [0usize, 1, 7, 8, 9, 15, 16, 17, 31, 32, 33, 63] {
        let mut input = Vec::new();
        input.extend(std::iter::repeat(b' ').take(pad));
        input.extend_from_slice(b"42");
        let doc = parse(&input).unwrap_or_else(|e| panic!("pad={pad} failed: {e:?}"));
        assert_eq!(doc.root().int_get(), Some(42), "pad={pad}");
    }
}

#[test]
fn digit_runs_around_chunk_boundaries_parse_correctly() {
    for len in [1usize, 7, 8, 9, 15, 16, 17, 18, 19, 20] {
        let digits = "9".repeat(len);
        let doc = parse(digits.as_bytes()).unwrap_or_else(|e| panic!("len={len} failed: {e:?}"));
        assert!(doc.root().int_get().is_some() || doc.root().bigint_get().is_some(), "len={len}");
    }
}

#[test]
fn identifiers_around_chunk_boundaries_parse_correctly() {
    for len in [1usize, 7, 8, 9, 15, 16, 17, 31, 32, 33] {
        let name: String = std::iter::repeat('a').take(len).collect();
        let doc = parse(name.as_bytes()).unwrap_or_else(|e| panic!("len={len} failed: {e:?}"));
        let sym = doc.root().symbol_get().unwrap_or_else(|| panic!("len={len} not a symbol"));
        assert_eq!(sym.name.len(), len);
    }
}

#[test]
fn strings_around_chunk_boundaries_parse_correctly() {
    for len in [0usize, 7, 8, 9, 15, 16, 17, 31, 32, 33] {
        let body: String = std::iter::repeat('x').take(len).collect();
        let input = format!("\"{body}\"");
        let doc = parse(input.as_bytes()).unwrap_or_else(|e| panic!("len={len} failed: {e:?}"));
        let s = doc.root().string_get().unwrap();
        assert_eq!(s.raw.len(), len);
    }
}

#[test]
fn vectors_with_many_elements_spanning_several_chunks_parse_correctly() {
    for count in [0usize, 15, 16, 17, 63, 64, 65, 200] {
        let input = vector_of_len(count);
        let doc = parse(&input).unwrap_or_else(|e| panic!("count={count} failed: {e:?}"));
        assert_eq!(doc.root().vector_count(), Some(count));
    }
}
