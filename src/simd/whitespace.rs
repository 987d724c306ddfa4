//! `skip_whitespace_and_comments`: advance across runs of whitespace and
//! `;`…`\n` line comments.

use crate::classify::is_whitespace;

/// Returns the offset of the first byte in `input[from..]` that is neither
/// whitespace nor part of a `;` line comment, or `input.len()` if the tail
/// is entirely whitespace/comments.
#[inline]
pub fn skip_whitespace_and_comments(input: &[u8], from: usize) -> usize {
    let mut i = from;
    loop {
        i = skip_whitespace_run(input, i);
        if i < input.len() && input[i] == b';' {
            i = skip_line_comment(input, i);
            continue;
        }
        return i;
    }
}

#[inline]
fn skip_line_comment(input: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < input.len() && input[i] != b'\n' {
        i += 1;
    }
    // Leave the newline itself for the whitespace scanner to consume; it is
    // whitespace too, so the next loop iteration handles it uniformly.
    i
}

#[inline]
fn skip_whitespace_run(input: &[u8], from: usize) -> usize {
    #[cfg(target_arch = "x86_64")]
    {
        return sse2::skip_whitespace_run(input, from);
    }
    #[cfg(target_arch = "aarch64")]
    {
        return neon::skip_whitespace_run(input, from);
    }
    #[allow(unreachable_code)]
    {
        scalar::skip_whitespace_run(input, from)
    }
}

pub mod scalar {
    use super::is_whitespace;

    #[inline]
    pub fn skip_whitespace_run(input: &[u8], from: usize) -> usize {
        let mut i = from;
        while i < input.len() && is_whitespace(input[i]) {
            i += 1;
        }
        i
    }
}

#[cfg(target_arch = "x86_64")]
mod sse2 {
    use super::scalar;
    use crate::simd::SHORT_INPUT_GUARD;
    use std::arch::x86_64::*;

    #[inline]
    pub fn skip_whitespace_run(input: &[u8], from: usize) -> usize {
        if input.len() - from < SHORT_INPUT_GUARD {
            return scalar::skip_whitespace_run(input, from);
        }
        let mut i = from;
        // SSE2 is baseline on x86_64, so this is always available; no
        // runtime feature probe is needed.
        unsafe {
            while i + 16 <= input.len() {
                let chunk = _mm_loadu_si128(input.as_ptr().add(i) as *const __m128i);
                let mask = whitespace_mask(chunk);
                let bits = _mm_movemask_epi8(mask) as u32;
                if bits != 0xFFFF {
                    // At least one non-whitespace byte in this chunk.
                    let first_non_ws = (!bits).trailing_zeros() as usize;
                    return i + first_non_ws;
                }
                i += 16;
            }
        }
        scalar::skip_whitespace_run(input, i)
    }

    /// Builds a byte mask where whitespace bytes compare equal (0xFF) by
    /// OR-ing together comparisons against each whitespace byte value,
    /// since SSE2 has no native "is in this small byte set" instruction.
    #[inline]
    unsafe fn whitespace_mask(chunk: __m128i) -> __m128i {
        unsafe {
            let space = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b' ' as i8));
            let tab = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b'\t' as i8));
            let lf = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b'\n' as i8));
            let cr = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b'\r' as i8));
            let vt = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(0x0B));
            let ff = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(0x0C));
            let comma = _mm_cmpeq_epi8(chunk, _mm_set1_epi8(b',' as i8));
            // ASCII group separators 0x1C..=0x1F: range check via unsigned
            // compare trick (subtract 0x1C, compare <= 3).
            let shifted = _mm_sub_epi8(chunk, _mm_set1_epi8(0x1C));
            let in_group_sep = _mm_cmpeq_epi8(
                _mm_min_epu8(shifted, _mm_set1_epi8(3)),
                shifted,
            );
            // `in_group_sep` is only meaningful where the original byte was
            // in range 0x1C..=0x7F due to the unsigned wraparound of the
            // subtraction for bytes below 0x1C; mask those false positives
            // out by also requiring shifted <= 3 as unsigned, which
            // `_mm_min_epu8` already encodes, and additionally that the
            // original byte is not itself e.g. 0xFF (shifted wraps to
            // 0xE3 > 3, already excluded).
            let mut mask = _mm_or_si128(space, tab);
            mask = _mm_or_si128(mask, lf);
            mask = _mm_or_si128(mask, cr);
            mask = _mm_or_si128(mask, vt);
            mask = _mm_or_si128(mask, ff);
            mask = _mm_or_si128(mask, comma);
            mask = _mm_or_si128(mask, in_group_sep);
            mask
        }
    }

}

#[cfg(target_arch = "aarch64")]
mod neon {
    use super::scalar;

    // NEON byte-equality masks would mirror the SSE2 path above using
    // `vceqq_u8`/`vmaxvq_u8`; until a NEON CI runner is wired up for this
    // crate, aarch64 builds use the scalar loop, which is already
    // branch-predictor-friendly for the short runs typical of EDN
    // indentation.
    #[inline]
    pub fn skip_whitespace_run(input: &[u8], from: usize) -> usize {
        scalar::skip_whitespace_run(input, from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_spaces_tabs_newlines_commas() {
        let input = b"   \t\n,,,abc";
        assert_eq!(skip_whitespace_and_comments(input, 0), 7);
    }

    #[test]
    fn skips_line_comments() {
        let input = b"; a comment\n42";
        assert_eq!(skip_whitespace_and_comments(input, 0), 12);
    }

    #[test]
    fn skips_interleaved_whitespace_and_comments() {
        let input = b"  ; one\n  ; two\n  x";
        assert_eq!(skip_whitespace_and_comments(input, 0), 18);
    }

    #[test]
    fn comment_running_to_eof_has_no_trailing_newline() {
        let input = b"; trailing comment";
        assert_eq!(skip_whitespace_and_comments(input, 0), input.len());
    }

    #[test]
    fn empty_input_returns_end() {
        assert_eq!(skip_whitespace_and_comments(b"", 0), 0);
    }
}
