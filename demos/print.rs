//! A minimal, test-only printer that turns a parsed [`Value`] back into EDN
//! text. Not part of the published library surface: just enough fidelity to
//! exercise the round-trip contracts in `tests/round_trip.rs`.

use edn_reader::{SymbolRef, Value, Variant};

pub fn print(value: &Value<'_>) -> String {
    let mut out = String::new();
    if let Some(meta) = value.metadata() {
        out.push('^');
        out.push_str(&print(meta));
        out.push(' ');
    }
    print_variant(value, &mut out);
    out
}

fn print_variant(value: &Value<'_>, out: &mut String) {
    match value.variant() {
        Variant::Nil => out.push_str("nil"),
        Variant::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Variant::Int(n) => out.push_str(&n.to_string()),
        Variant::Float(f) => out.push_str(&print_float(*f)),
        Variant::BigInt(big) => {
            if big.negative {
                out.push('-');
            }
            print_digits(big.raw, out);
            if big.radix != 10 {
                panic!("radix bigint printing is not exercised by the round-trip tests");
            }
            out.push('N');
        }
        Variant::BigDecimal(dec) => {
            if dec.negative {
                out.push('-');
            }
            print_digits(dec.raw, out);
            out.push('M');
        }
        Variant::Ratio { numer, denom } => {
            out.push_str(&numer.to_string());
            out.push('/');
            out.push_str(&denom.to_string());
        }
        Variant::BigRatio(r) => {
            if r.numer_negative {
                out.push('-');
            }
            print_digits(r.numer, out);
            out.push('/');
            if r.denom_negative {
                out.push('-');
            }
            print_digits(r.denom, out);
        }
        Variant::Character(c) => {
            out.push('\\');
            match c {
                ' ' => out.push_str("space"),
                '\n' => out.push_str("newline"),
                '\t' => out.push_str("tab"),
                '\r' => out.push_str("return"),
                c => out.push(*c),
            }
        }
        Variant::String(s) => {
            out.push('"');
            out.push_str(&String::from_utf8_lossy(s.raw));
            out.push('"');
        }
        Variant::Symbol(s) => print_symbol(s, out),
        Variant::Keyword(s) => {
            out.push(':');
            print_symbol(s, out);
        }
        Variant::List(items) => print_seq(items, '(', ')', out),
        Variant::Vector(items) => print_seq(items, '[', ']', out),
        Variant::Set(items) => {
            out.push_str("#{");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&print(item));
            }
            out.push('}');
        }
        Variant::Map(entries) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&print(k));
                out.push(' ');
                out.push_str(&print(v));
            }
            out.push('}');
        }
        Variant::Tagged(t) => {
            out.push('#');
            out.push_str(&String::from_utf8_lossy(t.tag));
            out.push(' ');
            out.push_str(&print(t.value));
        }
    }
}

fn print_digits(raw: &[u8], out: &mut String) {
    let cleaned: Vec<u8> = raw.iter().copied().filter(|&b| b != b'_').collect();
    out.push_str(&String::from_utf8_lossy(&cleaned));
}

fn print_symbol(s: &SymbolRef<'_>, out: &mut String) {
    if s.is_qualified() {
        out.push_str(&String::from_utf8_lossy(s.namespace));
        out.push('/');
    }
    out.push_str(&String::from_utf8_lossy(s.name));
}

fn print_seq(items: &[&Value<'_>], open: char, close: char, out: &mut String) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&print(item));
    }
    out.push(close);
}

fn print_float(f: f64) -> String {
    if f.is_nan() {
        return "##NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "##Inf".to_string() } else { "##-Inf".to_string() };
    }
    let s = format!("{f}");
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{s}.0")
    }
}
