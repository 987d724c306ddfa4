//! String literal reader: fast raw-slice path when no escapes are present,
//! slow escape-decoding path otherwise, plus the optional Java-style text
//! block extension.

use crate::arena::Arena;
use crate::error::{Error, ParseError, Span};
use crate::simd::string::find_string_terminator;
use crate::value::StringRef;

/// Reads a string literal starting just after the opening `"` at
/// `input[start]` (i.e. `input[start - 1] == b'"'`). Returns the
/// [`StringRef`] and the offset one past the closing quote.
pub fn read_string<'a>(
    input: &'a [u8],
    start: usize,
    arena: &'a Arena,
) -> Result<(StringRef<'a>, usize), ParseError> {
    let scan = find_string_terminator(input, start)
        .ok_or_else(|| ParseError::new(Error::InvalidString("unterminated string".into()), Span::new(start, input.len())))?;

    if !scan.has_escapes {
        let raw = &input[start..scan.end];
        return Ok((StringRef::raw(raw), scan.end + 1));
    }

    let raw = &input[start..scan.end];
    let decoded = decode_escapes(raw, start)?;
    let decoded = arena.alloc_str(&decoded)?;
    Ok((StringRef::with_decoded(raw, decoded), scan.end + 1))
}

/// Decodes backslash escapes in `raw` (the bytes strictly between the
/// quotes) into an owned `String`. `literal_start` is the offset of `raw[0]`
/// in the original input, used only to anchor error spans.
fn decode_escapes(raw: &[u8], literal_start: usize) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'\\' => {
                let esc_start = literal_start + i;
                let next = *raw.get(i + 1).ok_or_else(|| {
                    ParseError::new(Error::InvalidEscape("dangling backslash".into()), Span::point(esc_start))
                })?;
                match next {
                    b'"' => {
                        out.push('"');
                        i += 2;
                    }
                    b'\\' => {
                        out.push('\\');
                        i += 2;
                    }
                    b'/' => {
                        out.push('/');
                        i += 2;
                    }
                    b'b' => {
                        out.push('\u{8}');
                        i += 2;
                    }
                    b'f' => {
                        out.push('\u{C}');
                        i += 2;
                    }
                    b'n' => {
                        out.push('\n');
                        i += 2;
                    }
                    b'r' => {
                        out.push('\r');
                        i += 2;
                    }
                    b't' => {
                        out.push('\t');
                        i += 2;
                    }
                    b'u' => {
                        let (ch, consumed) = decode_unicode_escape(raw, i + 2, esc_start)?;
                        out.push(ch);
                        i += 2 + consumed;
                    }
                    other => {
                        return Err(ParseError::new(
                            Error::InvalidEscape(format!("unknown escape '\\{}'", other as char)),
                            Span::point(esc_start),
                        ));
                    }
                }
            }
            b => {
                // Multi-byte UTF-8 sequences pass through byte-for-byte;
                // `raw` is a substring of the (already UTF-8-validated)
                // input, so copying raw bytes and re-validating at the end
                // would be redundant. Instead decode one `char` at a time
                // via the standard UTF-8 decoder over the remaining slice.
                let ch_len = utf8_char_len(b);
                let ch_bytes = &raw[i..i + ch_len];
                let s = std::str::from_utf8(ch_bytes)
                    .map_err(|_| ParseError::new(Error::InvalidString("invalid UTF-8".into()), Span::point(literal_start + i)))?;
                out.push_str(s);
                i += ch_len;
            }
        }
    }
    Ok(out)
}

fn utf8_char_len(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Decodes a `\uXXXX` escape starting right after the `u`, combining a
/// leading UTF-16 surrogate pair (`\uD800-\uDBFF` followed by
/// `\uDC00-\uDFFF`) into a single scalar value. Returns the decoded `char`
/// and the number of raw bytes consumed *after* the `\u` marker that
/// produced it (4, or 10 for a surrogate pair).
fn decode_unicode_escape(raw: &[u8], at: usize, esc_start: usize) -> Result<(char, usize), ParseError> {
    let high = parse_hex4(raw, at, esc_start)?;
    if (0xD800..=0xDBFF).contains(&high) {
        if raw.get(at + 4) == Some(&b'\\') && raw.get(at + 5) == Some(&b'u') {
            let low = parse_hex4(raw, at + 6, esc_start)?;
            if (0xDC00..=0xDFFF).contains(&low) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                let ch = char::from_u32(combined)
                    .ok_or_else(|| ParseError::new(Error::InvalidEscape("invalid surrogate pair".into()), Span::point(esc_start)))?;
                return Ok((ch, 10));
            }
        }
        return Err(ParseError::new(Error::InvalidEscape("unpaired high surrogate".into()), Span::point(esc_start)));
    }
    if (0xDC00..=0xDFFF).contains(&high) {
        return Err(ParseError::new(Error::InvalidEscape("unpaired low surrogate".into()), Span::point(esc_start)));
    }
    let ch = char::from_u32(high)
        .ok_or_else(|| ParseError::new(Error::InvalidEscape("invalid codepoint".into()), Span::point(esc_start)))?;
    Ok((ch, 4))
}

fn parse_hex4(raw: &[u8], at: usize, esc_start: usize) -> Result<u32, ParseError> {
    let digits = raw
        .get(at..at + 4)
        .ok_or_else(|| ParseError::new(Error::InvalidEscape("truncated \\u escape".into()), Span::point(esc_start)))?;
    let text = std::str::from_utf8(digits)
        .map_err(|_| ParseError::new(Error::InvalidEscape("invalid \\u escape".into()), Span::point(esc_start)))?;
    u32::from_str_radix(text, 16).map_err(|_| ParseError::new(Error::InvalidEscape("invalid \\u escape".into()), Span::point(esc_start)))
}

/// Reads a Java-style text block: `"""<newline>...lines...<newline>"""`,
/// with the smallest common leading-whitespace indent across all non-blank
/// lines stripped, and the closing delimiter's own indentation (if any)
/// setting that common indent per the usual text-block convention.
///
/// `start` is the offset just past the opening `"""` and its mandatory
/// newline.
#[cfg(feature = "text-blocks")]
pub fn read_text_block<'a>(
    input: &'a [u8],
    start: usize,
    arena: &'a Arena,
) -> Result<(StringRef<'a>, usize), ParseError> {
    let end = find_text_block_terminator(input, start)
        .ok_or_else(|| ParseError::new(Error::InvalidString("unterminated text block".into()), Span::new(start, input.len())))?;

    let body = &input[start..end];
    let text = std::str::from_utf8(body)
        .map_err(|_| ParseError::new(Error::InvalidString("invalid UTF-8 in text block".into()), Span::point(start)))?;
    // The only recognized escape inside a text block is `\"""`, unescaping
    // to a literal `"""`; every other byte (including a lone `\`) passes
    // through unchanged.
    let text = unescape_text_block(text);
    let text: &str = &text;

    let lines: Vec<&str> = text.split('\n').collect();
    let last_idx = lines.len() - 1;
    // The closing delimiter's own line always counts toward the common
    // indent, even when it is the only blank line; every other blank line
    // is excluded, matching the usual text-block incidental-whitespace rule.
    let common_indent = lines
        .iter()
        .enumerate()
        .filter(|(idx, l)| *idx == last_idx || !l.trim().is_empty())
        .map(|(_, l)| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    // Strip the common leading indent, then trim trailing whitespace per
    // line. Joining with "\n" (rather than appending a terminator to each
    // line) reproduces the rule that a trailing newline appears in the
    // decoded text iff the closing delimiter sat on its own line: when it
    // did, the last element here is that (now-empty) delimiter line, which
    // contributes no characters but leaves the separator before it; when
    // the delimiter immediately followed content, that content is the last
    // element and no extra separator follows it.
    let stripped: Vec<&str> = lines
        .iter()
        .map(|l| l.get(common_indent.min(l.len())..).unwrap_or("").trim_end())
        .collect();
    let joined = stripped.join("\n");
    let decoded = arena.alloc_str(&joined)?;
    Ok((StringRef::pre_decoded(decoded), end + 3))
}

/// Unescapes every `\"""` occurrence in a text block's body to a literal
/// `"""`; no other escape form is recognized inside a text block.
#[cfg(feature = "text-blocks")]
fn unescape_text_block(text: &str) -> String {
    text.replace("\\\"\"\"", "\"\"\"")
}

#[cfg(feature = "text-blocks")]
fn find_text_block_terminator(input: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 3 <= input.len() {
        if input[i] == b'\\' && i + 4 <= input.len() && &input[i + 1..i + 4] == b"\"\"\"" {
            // `\"""` is the text block's only escape; skip the whole
            // 4-byte sequence so the literal `"""` it unescapes to is not
            // mistaken for the closing delimiter.
            i += 4;
            continue;
        }
        if &input[i..i + 3] == b"\"\"\"" {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read<'a>(arena: &'a Arena, input: &'a [u8]) -> (StringRef<'a>, usize) {
        // Caller passes the bytes strictly after the opening quote, through
        // and including the closing quote.
        read_string(input, 0, arena).unwrap()
    }

    #[test]
    fn reads_plain_string_without_escapes() {
        let arena = Arena::new();
        let (s, end) = read(&arena, b"hello\" trailing");
        assert!(!s.has_escapes);
        assert_eq!(s.decode(), "hello");
        assert_eq!(end, 6);
    }

    #[test]
    fn decodes_simple_escapes() {
        let arena = Arena::new();
        let (s, _) = read(&arena, br#"line1\nline2\ttab\""#);
        assert_eq!(s.decode(), "line1\nline2\ttab\"");
    }

    #[test]
    fn decodes_unicode_escape() {
        let arena = Arena::new();
        let (s, _) = read(&arena, br#"\u0041\""#);
        assert_eq!(s.decode(), "A");
    }

    #[test]
    fn decodes_surrogate_pair_escape() {
        let arena = Arena::new();
        let (s, _) = read(&arena, br#"\uD83D\uDE00\""#);
        assert_eq!(s.decode(), "\u{1F600}");
    }

    #[test]
    fn passes_through_literal_multibyte_character() {
        let arena = Arena::new();
        let (s, _) = read(&arena, "😀\" trailing".as_bytes());
        assert_eq!(s.decode(), "😀");
    }

    #[test]
    fn unpaired_surrogate_is_an_error() {
        let arena = Arena::new();
        let err = read_string(br#"\uD800\""#, 0, &arena).unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidEscape(_)));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let arena = Arena::new();
        let err = read_string(b"no closing quote here", 0, &arena).unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidString(_)));
    }

    #[test]
    fn passes_through_multibyte_utf8() {
        let arena = Arena::new();
        let input = "caf\u{e9}\"".as_bytes();
        let (s, _) = read_string(input, 0, &arena).unwrap();
        assert_eq!(s.decode(), "caf\u{e9}");
    }

    #[cfg(feature = "text-blocks")]
    #[test]
    fn strips_common_indent_from_text_block() {
        // The closing delimiter sits on its own line, so the decoded text
        // carries a trailing newline.
        let arena = Arena::new();
        let input = b"\n    line one\n    line two\n    \"\"\"";
        let (s, end) = read_text_block(input, 1, &arena).unwrap();
        assert_eq!(s.decode(), "line one\nline two\n");
        assert_eq!(&input[end - 3..end], b"\"\"\"");
    }

    #[cfg(feature = "text-blocks")]
    #[test]
    fn text_block_with_delimiter_immediately_after_content_has_no_trailing_newline() {
        let arena = Arena::new();
        let input = b"\n    line one\n    line two\"\"\"";
        let (s, _) = read_text_block(input, 1, &arena).unwrap();
        assert_eq!(s.decode(), "line one\nline two");
    }

    #[cfg(feature = "text-blocks")]
    #[test]
    fn text_block_trims_trailing_whitespace_per_line() {
        let arena = Arena::new();
        let input = b"\n  line one   \n  line two\n  \"\"\"";
        let (s, _) = read_text_block(input, 1, &arena).unwrap();
        assert_eq!(s.decode(), "line one\nline two\n");
    }

    #[cfg(feature = "text-blocks")]
    #[test]
    fn text_block_unescapes_embedded_triple_quote() {
        let arena = Arena::new();
        let input = b"\n  say \\\"\"\" hi\n  \"\"\"";
        let (s, _) = read_text_block(input, 1, &arena).unwrap();
        assert_eq!(s.decode(), "say \"\"\" hi\n");
    }
}
