//! Numeric literal reader: sign, radix notation, hex/octal, big integers,
//! big decimals, rationals, and the Clinger fast path for decimal floats.

use crate::arena::Arena;
use crate::classify::is_digit;
use crate::error::{Error, ParseError, Span};
use crate::simd::digits::scan_digits;
use crate::value::{BigDecimalRef, BigIntRef, BigRatioRef, Variant};

/// Precomputed exact powers of ten, `10^0 ..= 10^22`. Every value in this
/// range is exactly representable as `f64`, which is what makes the
/// Clinger fast path exact rather than merely close.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16, 1e17,
    1e18, 1e19, 1e20, 1e21, 1e22,
];

/// `floor(i64::MAX / radix)`, used to detect decimal/radix-integer overflow
/// one digit before it happens.
fn overflow_threshold(radix: u64) -> u64 {
    i64::MAX as u64 / radix
}

fn digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'z' => Some((b - b'a') as u32 + 10),
        b'A'..=b'Z' => Some((b - b'A') as u32 + 10),
        _ => None,
    }
}

fn is_radix_digit(b: u8, radix: u32) -> bool {
    match digit_value(b) {
        Some(v) => v < radix,
        None => false,
    }
}

/// Scans a run of radix digits (optionally with `_` separators), returning
/// the end offset and the cleaned digit bytes are left for the caller to
/// extract as `input[start..end]` (underscore stripping happens lazily via
/// `BigIntRef::cleaned`).
fn scan_radix_digits(input: &[u8], from: usize, radix: u32, allow_underscore: bool) -> usize {
    let mut i = from;
    let mut last_was_digit = false;
    while i < input.len() {
        let b = input[i];
        if is_radix_digit(b, radix) {
            last_was_digit = true;
            i += 1;
        } else if allow_underscore && b == b'_' && last_was_digit {
            // Only consume the underscore if a digit follows; a trailing
            // underscore is left for the caller to reject.
            if i + 1 < input.len() && is_radix_digit(input[i + 1], radix) {
                last_was_digit = false;
                i += 1;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    i
}

/// Parses `digits` (no underscores; caller has already stripped them) in
/// the given `radix` into an `i64`, returning `None` on overflow.
fn parse_radix_i64(digits: &[u8], radix: u32, negative: bool) -> Option<i64> {
    let threshold = overflow_threshold(radix as u64);
    let mut acc: u64 = 0;
    for &b in digits {
        let d = digit_value(b)? as u64;
        if acc > threshold {
            return None;
        }
        acc = acc.wrapping_mul(radix as u64);
        let (next, overflowed) = acc.overflowing_add(d);
        if overflowed {
            return None;
        }
        acc = next;
    }
    if negative {
        if acc > i64::MAX as u64 + 1 {
            return None;
        }
        if acc == i64::MAX as u64 + 1 {
            return Some(i64::MIN);
        }
        Some(-(acc as i64))
    } else {
        if acc > i64::MAX as u64 {
            return None;
        }
        Some(acc as i64)
    }
}

fn binary_gcd(mut a: u64, mut b: u64) -> u64 {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    let shift = (a | b).trailing_zeros();
    a >>= a.trailing_zeros();
    loop {
        b >>= b.trailing_zeros();
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        b -= a;
        if b == 0 {
            break;
        }
    }
    a << shift
}

/// Outcome of reading one numeric literal.
pub struct NumberResult<'a> {
    pub variant: Variant<'a>,
    pub end: usize,
}

/// Options the number reader consults; these mirror the compile-time
/// dialect feature flags but are threaded through as
/// plain booleans so the reader logic does not fork into separately
/// maintained code paths per feature combination.
#[derive(Debug, Clone, Copy)]
pub struct NumberDialect {
    pub extended_numbers: bool,
    pub ratios: bool,
}

impl Default for NumberDialect {
    fn default() -> Self {
        Self {
            extended_numbers: cfg!(feature = "extended-numbers"),
            ratios: cfg!(feature = "ratios"),
        }
    }
}

/// Reads a numeric literal starting at `input[start]`, which must be `+`,
/// `-`, `.` (with a following digit), or a digit.
pub fn read_number<'a>(
    input: &'a [u8],
    start: usize,
    arena: &'a Arena,
    dialect: NumberDialect,
) -> Result<NumberResult<'a>, ParseError> {
    let mut pos = start;
    let negative = match input.get(pos) {
        Some(b'+') => {
            pos += 1;
            false
        }
        Some(b'-') => {
            pos += 1;
            true
        }
        _ => false,
    };

    // Radix notation `NrDDD`: only attempted in extended mode, and only
    // when the digit run preceding `r`/`R` is itself all-decimal.
    if dialect.extended_numbers {
        let digit_end = scan_digits(input, pos);
        if digit_end > pos && matches!(input.get(digit_end), Some(b'r') | Some(b'R')) {
            let radix_digits = &input[pos..digit_end];
            let radix: u32 = std::str::from_utf8(radix_digits)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| invalid_number(start, digit_end, "bad radix prefix"))?;
            if !(2..=36).contains(&radix) {
                return Err(ParseError::new(Error::InvalidRadix(radix), Span::new(start, digit_end)));
            }
            let body_start = digit_end + 1;
            let body_end = scan_radix_digits(input, body_start, radix, dialect.extended_numbers);
            if body_end == body_start {
                return Err(invalid_number(start, body_end, "radix literal has no digits"));
            }
            return finish_integer(input, start, body_start, body_end, negative, radix, arena);
        }
    }

    // Hex (`0x`/`0X`) and octal (leading zero followed by a digit).
    if dialect.extended_numbers && input.get(pos) == Some(&b'0') {
        match input.get(pos + 1) {
            Some(b'x') | Some(b'X') => {
                let body_start = pos + 2;
                let body_end = scan_radix_digits(input, body_start, 16, dialect.extended_numbers);
                if body_end == body_start {
                    return Err(invalid_number(start, body_end, "hex literal has no digits"));
                }
                return finish_integer(input, start, body_start, body_end, negative, 16, arena);
            }
            Some(b'0'..=b'9') => {
                // Leading zero(s) followed by a digit: octal. Skip the run
                // of redundant leading zeros, then parse the remainder in
                // radix 8.
                let mut body_start = pos;
                while input.get(body_start) == Some(&b'0') && input.get(body_start + 1).is_some_and(u8::is_ascii_digit) {
                    body_start += 1;
                }
                let body_end = scan_radix_digits(input, body_start, 8, dialect.extended_numbers);
                // `scan_radix_digits` stops at the first byte that isn't a
                // valid radix-8 digit, so it can never leave an `8`/`9`
                // inside `[body_start..body_end]`; the only place one can
                // show up is as the *stopping* byte. Treat that, and an
                // empty digit run, as the invalid-octal-digit case.
                if body_end == body_start || input.get(body_end).is_some_and(u8::is_ascii_digit) {
                    let err_end = if input.get(body_end).is_some_and(u8::is_ascii_digit) { body_end + 1 } else { body_end };
                    return Err(invalid_number(start, err_end, "invalid digit in octal literal"));
                }
                return finish_integer(input, start, body_start, body_end, negative, 8, arena);
            }
            _ => {}
        }
    }

    // Plain leading zero in standard mode is only valid as the lone digit
    // `0` (optionally followed by `.`/`e`/suffix); `01` etc. is an error.
    if !dialect.extended_numbers
        && input.get(pos) == Some(&b'0')
        && input.get(pos + 1).is_some_and(u8::is_ascii_digit)
    {
        return Err(invalid_number(start, pos + 1, "leading zero not allowed"));
    }

    // Decimal integer part.
    let int_start = pos;
    let int_end = scan_decimal_run(input, pos, dialect.extended_numbers);
    if int_end == int_start {
        return Err(invalid_number(start, pos, "expected a digit"));
    }
    pos = int_end;

    let mut has_frac = false;
    let mut frac_start = pos;
    let mut frac_end = pos;
    if input.get(pos) == Some(&b'.') && input.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        has_frac = true;
        pos += 1;
        frac_start = pos;
        frac_end = scan_decimal_run(input, pos, dialect.extended_numbers);
        if frac_end == frac_start {
            return Err(invalid_number(start, pos, "expected digits after decimal point"));
        }
        pos = frac_end;
    }

    let mut has_exp = false;
    if matches!(input.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp_pos = pos + 1;
        if matches!(input.get(exp_pos), Some(b'+') | Some(b'-')) {
            exp_pos += 1;
        }
        let exp_digits_start = exp_pos;
        let exp_digits_end = scan_decimal_run(input, exp_pos, dialect.extended_numbers);
        if exp_digits_end == exp_digits_start {
            return Err(invalid_number(start, exp_pos, "expected exponent digits"));
        }
        has_exp = true;
        pos = exp_digits_end;
    }

    // Suffix dispatch.
    let plain_integer = !has_frac && !has_exp;

    if plain_integer && input.get(pos) == Some(&b'N') {
        let end = pos + 1;
        return Ok(NumberResult {
            variant: Variant::BigInt(BigIntRef::new(negative, 10, &input[int_start..int_end])),
            end,
        });
    }

    if input.get(pos) == Some(&b'M') {
        let end = pos + 1;
        let raw_end = if has_exp { pos } else if has_frac { frac_end } else { int_end };
        return Ok(NumberResult {
            variant: Variant::BigDecimal(BigDecimalRef::new(negative, &input[int_start..raw_end])),
            end,
        });
    }

    if plain_integer && dialect.ratios && input.get(pos) == Some(&b'/') {
        let denom_start = pos + 1;
        let denom_end = scan_decimal_run(input, denom_start, dialect.extended_numbers);
        if denom_end == denom_start {
            return Err(invalid_number(start, denom_start, "expected denominator digits"));
        }
        return finish_ratio(
            input,
            start,
            int_start,
            int_end,
            negative,
            denom_start,
            denom_end,
            arena,
        )
        .map(|(variant, _)| NumberResult { variant, end: denom_end });
    }

    if has_frac || has_exp {
        let literal = &input[start..pos];
        // Digit runs may contain `_` separators (extended mode); neither
        // the Clinger fast path nor the `f64::from_str` fallback understand
        // them, so strip them the same way `finish_integer` does via
        // `BigIntRef::cleaned` before parsing either way. Only allocate
        // when a separator is actually present.
        let cleaned: std::borrow::Cow<'_, [u8]> = if literal.contains(&b'_') {
            std::borrow::Cow::Owned(literal.iter().copied().filter(|&b| b != b'_').collect())
        } else {
            std::borrow::Cow::Borrowed(literal)
        };
        let text =
            std::str::from_utf8(&cleaned).map_err(|_| invalid_number(start, pos, "non-utf8 float literal"))?;
        let to_cleaned_offset =
            |orig_offset: usize| orig_offset - start - input[start..orig_offset].iter().filter(|&&b| b == b'_').count();
        let c_int_start = to_cleaned_offset(int_start);
        let c_int_end = to_cleaned_offset(int_end);
        let c_frac_start = to_cleaned_offset(frac_start);
        let c_frac_end = to_cleaned_offset(frac_end);
        let value = match parse_float_fast(text, c_int_start, c_int_end, has_frac, c_frac_start, c_frac_end) {
            Some(f) => f,
            None => text.parse::<f64>().map_err(|_| invalid_number(start, pos, "malformed float literal"))?,
        };
        return Ok(NumberResult { variant: Variant::Float(value), end: pos });
    }

    finish_integer(input, start, int_start, int_end, negative, 10, arena)
}

fn scan_decimal_run(input: &[u8], from: usize, allow_underscore: bool) -> usize {
    scan_radix_digits(input, from, 10, allow_underscore)
}

fn invalid_number(start: usize, end: usize, msg: &str) -> ParseError {
    ParseError::new(Error::InvalidNumber(msg.to_string()), Span::new(start, end))
}

fn finish_integer<'a>(
    input: &'a [u8],
    lit_start: usize,
    body_start: usize,
    body_end: usize,
    negative: bool,
    radix: u32,
    arena: &'a Arena,
) -> Result<NumberResult<'a>, ParseError> {
    let raw = &input[body_start..body_end];
    if raw.first() == Some(&b'_') || raw.last() == Some(&b'_') {
        return Err(invalid_number(lit_start, body_end, "underscore at start/end of digit run"));
    }
    let bigint_ref = BigIntRef::new(negative, radix, raw);
    let cleaned = bigint_ref.cleaned(arena)?;
    match parse_radix_i64(cleaned, radix, negative) {
        Some(n) => Ok(NumberResult { variant: Variant::Int(n), end: body_end }),
        None => Ok(NumberResult { variant: Variant::BigInt(bigint_ref), end: body_end }),
    }
}

fn finish_ratio<'a>(
    input: &'a [u8],
    lit_start: usize,
    numer_start: usize,
    numer_end: usize,
    numer_negative: bool,
    denom_start: usize,
    denom_end: usize,
    arena: &'a Arena,
) -> Result<(Variant<'a>, usize), ParseError> {
    let numer_raw = &input[numer_start..numer_end];
    let denom_raw = &input[denom_start..denom_end];

    let numer_i64 = parse_radix_i64(numer_raw, 10, numer_negative);
    let denom_i64 = parse_radix_i64(denom_raw, 10, false);

    match (numer_i64, denom_i64) {
        (Some(n), Some(d)) => {
            if d == 0 {
                return Err(ParseError::new(Error::DivideByZero, Span::new(lit_start, denom_end)));
            }
            if n == 0 {
                return Ok((Variant::Int(0), denom_end));
            }
            let (mut n, mut d) = (n, d);
            if d < 0 {
                n = -n;
                d = -d;
            }
            let g = binary_gcd(n.unsigned_abs(), d.unsigned_abs()) as i64;
            n /= g;
            d /= g;
            if d == 1 {
                Ok((Variant::Int(n), denom_end))
            } else {
                Ok((Variant::Ratio { numer: n, denom: d }, denom_end))
            }
        }
        _ => {
            // Either side overflowed i64: store as an unreduced BigRatio.
            // A fully reducing arbitrary-precision GCD is out of scope
            // (arbitrary-precision arithmetic is out of scope here); the
            // numerator and denominator are kept exactly as written.
            Ok((
                Variant::BigRatio(BigRatioRef {
                    numer_negative,
                    numer: numer_raw,
                    denom_negative: false,
                    denom: denom_raw,
                }),
                denom_end,
            ))
        }
    }
}

/// Clinger's fast path: exact when the mantissa has at most 15 significant
/// decimal digits, fits in 53 bits, and the decimal exponent magnitude is
/// at most 22 (so the scaling power of ten is itself exact).
fn parse_float_fast(
    text: &str,
    int_start: usize,
    int_end: usize,
    has_frac: bool,
    frac_start: usize,
    frac_end: usize,
) -> Option<f64> {
    let bytes = text.as_bytes();
    let negative = bytes.first() == Some(&b'-');

    let int_digits = &bytes[int_start..int_end];
    let frac_digits: &[u8] = if has_frac { &bytes[frac_start..frac_end] } else { &[] };

    let significant_digits = int_digits.len() + frac_digits.len();
    if significant_digits > 15 {
        return None;
    }

    let mut mantissa: u64 = 0;
    for &b in int_digits.iter().chain(frac_digits.iter()) {
        if !is_digit(b) {
            return None;
        }
        mantissa = mantissa.checked_mul(10)?.checked_add((b - b'0') as u64)?;
    }
    if mantissa > (1u64 << 53) - 1 {
        return None;
    }

    // Exponent from decimal point placement, before the explicit `e`
    // suffix (if any) is folded in.
    let point_exponent = -(frac_digits.len() as i32);

    let explicit_exp = parse_explicit_exponent(text)?;
    let exponent = point_exponent + explicit_exp;
    if exponent.unsigned_abs() as usize > 22 {
        return None;
    }

    let mut value = mantissa as f64;
    if exponent >= 0 {
        value *= POW10[exponent as usize];
    } else {
        value /= POW10[(-exponent) as usize];
    }
    Some(if negative { -value } else { value })
}

fn parse_explicit_exponent(text: &str) -> Option<i32> {
    match text.find(['e', 'E']) {
        None => Some(0),
        Some(idx) => text[idx + 1..].parse::<i32>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> (Variant<'_>, usize) {
        let arena_box = Box::leak(Box::new(Arena::new()));
        let input_box: &'static [u8] = Box::leak(input.as_bytes().to_vec().into_boxed_slice());
        let result = read_number(input_box, 0, arena_box, NumberDialect { extended_numbers: true, ratios: true }).unwrap();
        (result.variant, result.end)
    }

    #[test]
    fn parses_plain_int() {
        let (v, end) = parse("42");
        assert!(matches!(v, Variant::Int(42)));
        assert_eq!(end, 2);
    }

    #[test]
    fn parses_negative_int() {
        let (v, _) = parse("-17");
        assert!(matches!(v, Variant::Int(-17)));
    }

    #[test]
    fn parses_float_with_fraction() {
        let (v, _) = parse("3.14");
        match v {
            Variant::Float(f) => assert!((f - 3.14).abs() < 1e-12),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn parses_float_with_exponent() {
        let (v, _) = parse("1e10");
        match v {
            Variant::Float(f) => assert_eq!(f, 1e10),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn big_int_overflow_of_i64() {
        let (v, _) = parse("9223372036854775808");
        assert!(matches!(v, Variant::BigInt(_)));
    }

    #[test]
    fn int_min_fits_as_int() {
        let (v, _) = parse("-9223372036854775808");
        assert!(matches!(v, Variant::Int(i64::MIN)));
    }

    #[test]
    fn n_suffix_forces_bigint() {
        let (v, _) = parse("5N");
        assert!(matches!(v, Variant::BigInt(_)));
    }

    #[test]
    fn m_suffix_forces_bigdecimal() {
        let (v, _) = parse("3.14M");
        assert!(matches!(v, Variant::BigDecimal(_)));
    }

    #[test]
    fn ratio_reduces_to_lowest_terms() {
        let (v, _) = parse("4/6");
        match v {
            Variant::Ratio { numer, denom } => {
                assert_eq!(numer, 2);
                assert_eq!(denom, 3);
            }
            _ => panic!("expected ratio"),
        }
    }

    #[test]
    fn ratio_reducing_to_whole_number_is_int() {
        let (v, _) = parse("6/3");
        assert!(matches!(v, Variant::Int(2)));
    }

    #[test]
    fn ratio_with_zero_numerator_is_int_zero() {
        let (v, _) = parse("0/5");
        assert!(matches!(v, Variant::Int(0)));
    }

    #[test]
    fn ratio_with_zero_denominator_is_divide_by_zero() {
        let arena = Arena::new();
        let input = b"5/0".to_vec();
        let err = read_number(&input, 0, &arena, NumberDialect { extended_numbers: true, ratios: true }).unwrap_err();
        assert_eq!(*err.kind(), Error::DivideByZero);
    }

    #[test]
    fn hex_literal() {
        let (v, _) = parse("0xFF");
        assert!(matches!(v, Variant::Int(255)));
    }

    #[test]
    fn octal_literal() {
        let (v, _) = parse("0755");
        assert!(matches!(v, Variant::Int(493)));
    }

    #[test]
    fn radix_literal() {
        let (v, _) = parse("2r1010");
        assert!(matches!(v, Variant::Int(10)));
    }

    #[test]
    fn invalid_radix_out_of_range() {
        let arena = Arena::new();
        let input = b"1r0".to_vec();
        let err = read_number(&input, 0, &arena, NumberDialect { extended_numbers: true, ratios: true }).unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidRadix(1)));
    }

    #[test]
    fn underscore_separators_are_skipped() {
        let (v, _) = parse("1_000_000");
        assert!(matches!(v, Variant::Int(1_000_000)));
    }

    #[test]
    fn underscore_in_float_integer_part_is_skipped() {
        let (v, _) = parse("1_0.5");
        match v {
            Variant::Float(f) => assert_eq!(f, 10.5),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn underscore_in_float_exponent_is_skipped() {
        let (v, _) = parse("1e1_0");
        match v {
            Variant::Float(f) => assert_eq!(f, 1e10),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn octal_literal_with_invalid_digit_is_an_error() {
        let arena = Arena::new();
        let input = b"08".to_vec();
        let err = read_number(&input, 0, &arena, NumberDialect { extended_numbers: true, ratios: true }).unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidNumber(_)));
    }

    #[test]
    fn octal_literal_with_trailing_invalid_digit_is_an_error() {
        let arena = Arena::new();
        let input = b"0789".to_vec();
        let err = read_number(&input, 0, &arena, NumberDialect { extended_numbers: true, ratios: true }).unwrap_err();
        assert!(matches!(err.kind(), Error::InvalidNumber(_)));
    }
}
