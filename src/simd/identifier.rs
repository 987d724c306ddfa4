//! `scan_identifier`: advance across an identifier body (symbol, keyword, or
//! namespaced variant thereof), reporting the end offset, the offset of the
//! first unescaped `/` (namespace separator) if any, and whether two
//! adjacent colons were seen (auto-namespaced keyword marker, `::kw`).

use crate::classify::is_delimiter;
use crate::simd::SHORT_INPUT_GUARD;

/// Result of scanning an identifier body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierScan {
    /// Offset one past the last identifier byte.
    pub end: usize,
    /// Offset of the first `/` encountered, if any.
    pub first_slash: Option<usize>,
    /// Whether two adjacent `:` bytes were seen anywhere in the run.
    pub has_adjacent_colons: bool,
}

#[inline]
pub fn scan_identifier(input: &[u8], from: usize) -> IdentifierScan {
    if input.len() - from < SHORT_INPUT_GUARD {
        return scalar::scan_identifier(input, from);
    }
    #[cfg(target_arch = "x86_64")]
    {
        sse2::scan_identifier(input, from)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        scalar::scan_identifier(input, from)
    }
}

pub mod scalar {
    use super::{is_delimiter, IdentifierScan};

    #[inline]
    pub fn scan_identifier(input: &[u8], from: usize) -> IdentifierScan {
        let mut i = from;
        let mut first_slash = None;
        let mut has_adjacent_colons = false;
        let mut prev_colon = false;
        while i < input.len() && !is_delimiter(input[i]) {
            let b = input[i];
            if b == b'/' && first_slash.is_none() {
                first_slash = Some(i);
            }
            if b == b':' {
                if prev_colon {
                    has_adjacent_colons = true;
                }
                prev_colon = true;
            } else {
                prev_colon = false;
            }
            i += 1;
        }
        IdentifierScan { end: i, first_slash, has_adjacent_colons }
    }
}

#[cfg(target_arch = "x86_64")]
mod sse2 {
    use super::{scalar, IdentifierScan};
    use std::arch::x86_64::*;

    /// Delimiter bytes are too numerous and irregular for a cheap SIMD
    /// membership test, so the vector stage only locates the *end* of the
    /// identifier run 16 bytes at a time; once the end is known, a single
    /// scalar pass over just that bounded range recovers the first-slash
    /// and adjacent-colon bookkeeping. This keeps the expensive byte-by-byte
    /// work limited to an already-known-short span instead of running it
    /// speculatively over the whole remaining input.
    #[inline]
    pub fn scan_identifier(input: &[u8], from: usize) -> IdentifierScan {
        let mut i = from;
        unsafe {
            while i + 16 <= input.len() {
                let chunk = _mm_loadu_si128(input.as_ptr().add(i) as *const __m128i);
                let bits = _mm_movemask_epi8(delimiter_mask(chunk)) as u32;
                if bits != 0 {
                    let first_delim = bits.trailing_zeros() as usize;
                    return scalar::scan_identifier(&input[..i + first_delim], from);
                }
                i += 16;
            }
        }
        // Fewer than 16 bytes remain with no delimiter found yet; the
        // scalar scanner finishes the job (and naturally stops at the
        // first genuine delimiter or end of input).
        scalar::scan_identifier(input, from)
    }

    #[inline]
    unsafe fn delimiter_mask(chunk: __m128i) -> __m128i {
        unsafe {
            // Bytes that terminate an identifier: whitespace plus the
            // EDN delimiter punctuation set (see classify::is_delimiter).
            let mut mask = _mm_setzero_si128();
            for &d in DELIMITER_BYTES {
                mask = _mm_or_si128(mask, _mm_cmpeq_epi8(chunk, _mm_set1_epi8(d as i8)));
            }
            mask
        }
    }

    const DELIMITER_BYTES: &[u8] = &[
        b' ', b'\t', b'\n', 0x0B, 0x0C, b'\r', b',', 0x1C, 0x1D, 0x1E, 0x1F, b'"', b'#', b'\'', b'(',
        b')', b';', b'@', b'[', b'\\', b']', b'^', b'`', b'{', b'}', b'~',
    ];

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn matches_scalar_on_generated_identifiers() {
            let cases: &[&[u8]] = &[
                b"plain-symbol-with-no-delimiters-at-all ",
                b"ns/name more-stuff-after ",
                b"auto::namespaced-keyword-body ",
                b"no-trailing-delimiter-at-all-so-it-runs-to-eof",
                b"short ",
            ];
            for case in cases {
                assert_eq!(
                    scalar::scan_identifier(case, 0),
                    scan_identifier(case, 0),
                    "mismatch on {case:?}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_plain_symbol() {
        let scan = scan_identifier(b"foo-bar ", 0);
        assert_eq!(scan.end, 7);
        assert_eq!(scan.first_slash, None);
        assert!(!scan.has_adjacent_colons);
    }

    #[test]
    fn finds_namespace_slash() {
        let scan = scan_identifier(b"ns.sub/name)", 0);
        assert_eq!(scan.end, 11);
        assert_eq!(scan.first_slash, Some(6));
    }

    #[test]
    fn detects_adjacent_colons() {
        let scan = scan_identifier(b"foo::bar ", 0);
        assert!(scan.has_adjacent_colons);
    }

    #[test]
    fn runs_to_input_end_without_delimiter() {
        let scan = scan_identifier(b"to-the-very-end", 0);
        assert_eq!(scan.end, 15);
    }
}
