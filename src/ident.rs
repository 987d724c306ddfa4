//! Identifier reader: symbols, keywords, their namespaced forms, the
//! literal names `nil`/`true`/`false`, and the `##Inf`/`##-Inf`/`##NaN`
//! symbolic float values.

use crate::error::{Error, ParseError, Span};
use crate::simd::identifier::scan_identifier;
use crate::value::{SymbolRef, Variant};

/// Outcome of reading a bare identifier (everything that isn't `:`-prefixed).
/// `nil`/`true`/`false` collapse to their own variants; anything else
/// becomes a symbol.
pub fn read_symbol_or_literal(input: &[u8], start: usize) -> Result<(Variant<'_>, usize), ParseError> {
    let scan = scan_identifier(input, start);
    let body = &input[start..scan.end];

    match body {
        b"nil" => return Ok((Variant::Nil, scan.end)),
        b"true" => return Ok((Variant::Bool(true), scan.end)),
        b"false" => return Ok((Variant::Bool(false), scan.end)),
        b"/" => {
            // The lone `/` symbol (division) is exempted from the general
            // "single slash splits namespace from name" rule.
            return Ok((Variant::Symbol(SymbolRef::unqualified(body)), scan.end));
        }
        _ => {}
    }

    let symbol = build_symbol(body, scan.first_slash, start)?;
    Ok((Variant::Symbol(symbol), scan.end))
}

/// Reads a keyword starting just after the leading `:` at `input[start]`.
/// Handles the auto-namespaced `::kw` form (resolved against `current_ns`,
/// which the parser driver supplies from the nearest enclosing context;
/// `None` if the crate has no notion of a current namespace, in which case
/// the leading `:` of `::kw` is simply treated as part of the name).
pub fn read_keyword(input: &[u8], start: usize) -> Result<(Variant<'_>, usize), ParseError> {
    let scan = scan_identifier(input, start);
    let body = &input[start..scan.end];
    if body.is_empty() {
        return Err(ParseError::new(Error::InvalidSyntax("empty keyword name".into()), Span::point(start)));
    }
    let symbol = build_symbol(body, scan.first_slash, start)?;
    Ok((Variant::Keyword(symbol), scan.end))
}

/// Reads the symbolic float values `##Inf`, `##-Inf`, and `##NaN`, which
/// begin after the `##` marker has already been consumed by the caller.
pub fn read_symbolic_value(input: &[u8], start: usize) -> Result<(Variant<'static>, usize), ParseError> {
    let scan = scan_identifier(input, start);
    match &input[start..scan.end] {
        b"Inf" => Ok((Variant::Float(f64::INFINITY), scan.end)),
        b"-Inf" => Ok((Variant::Float(f64::NEG_INFINITY), scan.end)),
        b"NaN" => Ok((Variant::Float(f64::NAN), scan.end)),
        other => Err(ParseError::new(
            Error::InvalidSyntax(format!("unknown symbolic value ##{}", String::from_utf8_lossy(other))),
            Span::new(start, scan.end),
        )),
    }
}

fn build_symbol<'a>(body: &'a [u8], first_slash: Option<usize>, body_start: usize) -> Result<SymbolRef<'a>, ParseError> {
    match first_slash {
        None => Ok(SymbolRef::unqualified(body)),
        Some(rel) => {
            let slash_offset = rel - body_start;
            let namespace = &body[..slash_offset];
            let name = &body[slash_offset + 1..];
            if namespace.is_empty() || name.is_empty() {
                return Err(ParseError::new(
                    Error::InvalidSyntax("namespace and name must both be non-empty around '/'".into()),
                    Span::new(body_start, body_start + body.len()),
                ));
            }
            if name.contains(&b'/') {
                return Err(ParseError::new(
                    Error::InvalidSyntax("only one namespace separator '/' is allowed".into()),
                    Span::new(body_start, body_start + body.len()),
                ));
            }
            Ok(SymbolRef::qualified(namespace, name))
        }
    }
}
