//! Structural equality, total ordering, and FNV-1a hashing over [`Value`]
//! trees — the duplicate-detection machinery EDN's set/map semantics need.

use std::cmp::Ordering;

use crate::value::{Value, Variant};

/// Recursion-depth cap for [`value_equal`] and [`value_compare`]. EDN
/// cannot itself produce a cyclic value, but a user reader function could
/// synthesize one; this cap turns that into "not equal" instead of a stack
/// overflow.
const MAX_COMPARE_DEPTH: usize = 100;

/// Deep structural equality.
pub fn value_equal(a: &Value<'_>, b: &Value<'_>) -> bool {
    equal_at_depth(a, b, 0)
}

fn equal_at_depth(a: &Value<'_>, b: &Value<'_>, depth: usize) -> bool {
    if depth >= MAX_COMPARE_DEPTH {
        return false;
    }

    // Cached hashes shortcut inequality without recursing.
    let ah = a.cached_hash_cell().get();
    let bh = b.cached_hash_cell().get();
    if ah != 0 && bh != 0 && ah != bh {
        return false;
    }

    match (a.variant(), b.variant()) {
        (Variant::Nil, Variant::Nil) => true,
        (Variant::Bool(x), Variant::Bool(y)) => x == y,
        (Variant::Int(x), Variant::Int(y)) => x == y,
        (Variant::Float(x), Variant::Float(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y
            }
        }
        (Variant::Character(x), Variant::Character(y)) => x == y,
        (Variant::String(x), Variant::String(y)) => x.has_escapes == y.has_escapes && x.raw == y.raw,
        (Variant::Symbol(x), Variant::Symbol(y)) | (Variant::Keyword(x), Variant::Keyword(y)) => {
            x.namespace == y.namespace && x.name == y.name
        }
        (Variant::BigInt(x), Variant::BigInt(y)) => {
            x.radix == y.radix
                && x.negative == y.negative
                && x.cleaned(a.arena()).ok() == y.cleaned(b.arena()).ok()
        }
        (Variant::BigDecimal(x), Variant::BigDecimal(y)) => {
            x.negative == y.negative && x.cleaned(a.arena()).ok() == y.cleaned(b.arena()).ok()
        }
        (Variant::Ratio { numer: n1, denom: d1 }, Variant::Ratio { numer: n2, denom: d2 }) => {
            n1 == n2 && d1 == d2
        }
        (Variant::BigRatio(x), Variant::BigRatio(y)) => {
            x.numer_negative == y.numer_negative
                && x.denom_negative == y.denom_negative
                && x.numer == y.numer
                && x.denom == y.denom
        }
        (Variant::Tagged(x), Variant::Tagged(y)) => {
            x.tag == y.tag && equal_at_depth(x.value, y.value, depth + 1)
        }
        (Variant::List(x), Variant::List(y)) | (Variant::Vector(x), Variant::Vector(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(xi, yi)| equal_at_depth(xi, yi, depth + 1))
        }
        (Variant::Set(x), Variant::Set(y)) => {
            x.len() == y.len()
                && x.iter().all(|xi| y.iter().any(|yi| equal_at_depth(xi, yi, depth + 1)))
        }
        (Variant::Map(x), Variant::Map(y)) => {
            x.len() == y.len()
                && x.iter().all(|(xk, xv)| {
                    y.iter().any(|(yk, yv)| {
                        equal_at_depth(xk, yk, depth + 1) && equal_at_depth(xv, yv, depth + 1)
                    })
                })
        }
        _ => false,
    }
}

/// Total order over values.
///
/// First orders by variant-kind ordinal, then per-variant. Collections fall
/// back to pointer-identity ordering, which is sufficient (and the only
/// requirement) for the post-sort duplicate scan used during set/map
/// construction: it just needs to be a *consistent* total order, not a
/// structurally meaningful one, because the linear scan afterward uses full
/// structural equality to detect duplicates.
pub fn value_compare(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    let ka = a.kind() as u8;
    let kb = b.kind() as u8;
    if ka != kb {
        return ka.cmp(&kb);
    }
    match (a.variant(), b.variant()) {
        (Variant::Nil, Variant::Nil) => Ordering::Equal,
        (Variant::Bool(x), Variant::Bool(y)) => x.cmp(y),
        (Variant::Int(x), Variant::Int(y)) => x.cmp(y),
        (Variant::Float(x), Variant::Float(y)) => compare_float_nan_as_infinity(*x, *y),
        (Variant::Character(x), Variant::Character(y)) => x.cmp(y),
        (Variant::String(x), Variant::String(y)) => (x.has_escapes, x.raw.len(), x.raw)
            .cmp(&(y.has_escapes, y.raw.len(), y.raw)),
        (Variant::Symbol(x), Variant::Symbol(y)) | (Variant::Keyword(x), Variant::Keyword(y)) => {
            (x.namespace.len(), x.namespace, x.name.len(), x.name)
                .cmp(&(y.namespace.len(), y.namespace, y.name.len(), y.name))
        }
        (Variant::BigInt(x), Variant::BigInt(y)) => {
            let xc = x.cleaned(a.arena()).unwrap_or(x.raw);
            let yc = y.cleaned(b.arena()).unwrap_or(y.raw);
            (x.radix, x.negative, xc.len(), xc).cmp(&(y.radix, y.negative, yc.len(), yc))
        }
        (Variant::BigDecimal(x), Variant::BigDecimal(y)) => {
            let xc = x.cleaned(a.arena()).unwrap_or(x.raw);
            let yc = y.cleaned(b.arena()).unwrap_or(y.raw);
            (x.negative, xc.len(), xc).cmp(&(y.negative, yc.len(), yc))
        }
        (Variant::Ratio { numer: n1, denom: d1 }, Variant::Ratio { numer: n2, denom: d2 }) => {
            (n1, d1).cmp(&(n2, d2))
        }
        (Variant::BigRatio(x), Variant::BigRatio(y)) => (
            x.numer_negative,
            x.numer.len(),
            x.numer,
            x.denom_negative,
            x.denom.len(),
            x.denom,
        )
            .cmp(&(y.numer_negative, y.numer.len(), y.numer, y.denom_negative, y.denom.len(), y.denom)),
        _ => {
            // Collections and Tagged use pointer identity as a tiebreaker;
            // every caller that needs this ordering (the uniqueness check in
            // `collection`) only ever compares values drawn from one
            // arena's distinct allocations, so no two non-identical values
            // share a pointer.
            let pa = a as *const Value<'_> as usize;
            let pb = b as *const Value<'_> as usize;
            pa.cmp(&pb)
        }
    }
}

fn compare_float_nan_as_infinity(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// FNV-1a offset basis and prime, 64-bit variant.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a_seeded(seed: u64, bytes: &[u8]) -> u64 {
    let mut hash = seed;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Normalizes a zero hash result to 1, since 0 is the "not yet computed"
/// sentinel in [`Value::cached_hash_cell`].
fn remap_sentinel(h: u64) -> u64 {
    if h == 0 {
        1
    } else {
        h
    }
}

/// Computes (and caches) the FNV-1a hash of `value`.
pub fn value_hash(value: &Value<'_>) -> u64 {
    let cell = value.cached_hash_cell();
    let cached = cell.get();
    if cached != 0 {
        return cached;
    }
    let h = remap_sentinel(hash_uncached(value));
    cell.set(h);
    h
}

fn hash_uncached(value: &Value<'_>) -> u64 {
    let kind_tag = &[value.kind() as u8];
    match value.variant() {
        Variant::Nil => fnv1a(kind_tag),
        Variant::Bool(b) => fnv1a_seeded(fnv1a(kind_tag), &[*b as u8]),
        Variant::Int(n) => fnv1a_seeded(fnv1a(kind_tag), &n.to_le_bytes()),
        Variant::Float(f) => {
            let bits = if f.is_nan() { 0x7FF8000000000000u64 } else { f.to_bits() };
            fnv1a_seeded(fnv1a(kind_tag), &bits.to_le_bytes())
        }
        Variant::Character(c) => fnv1a_seeded(fnv1a(kind_tag), &(*c as u32).to_le_bytes()),
        Variant::String(s) => {
            let h = fnv1a_seeded(fnv1a(kind_tag), &[s.has_escapes as u8]);
            fnv1a_seeded(h, s.raw)
        }
        Variant::Symbol(s) | Variant::Keyword(s) => {
            let h = fnv1a_seeded(fnv1a(kind_tag), s.namespace);
            fnv1a_seeded(h, s.name)
        }
        Variant::BigInt(b) => {
            let cleaned = b.cleaned(value.arena()).map(|c| c.to_vec()).unwrap_or_default();
            let h = fnv1a_seeded(fnv1a(kind_tag), &[b.negative as u8, b.radix as u8]);
            fnv1a_seeded(h, &cleaned)
        }
        Variant::BigDecimal(b) => {
            let cleaned = b.cleaned(value.arena()).map(|c| c.to_vec()).unwrap_or_default();
            let h = fnv1a_seeded(fnv1a(kind_tag), &[b.negative as u8]);
            fnv1a_seeded(h, &cleaned)
        }
        Variant::Ratio { numer, denom } => {
            let h = fnv1a_seeded(fnv1a(kind_tag), &numer.to_le_bytes());
            fnv1a_seeded(h, &denom.to_le_bytes())
        }
        Variant::BigRatio(r) => {
            let h = fnv1a_seeded(fnv1a(kind_tag), &[r.numer_negative as u8]);
            let h = fnv1a_seeded(h, r.numer);
            let h = fnv1a_seeded(h, &[r.denom_negative as u8]);
            fnv1a_seeded(h, r.denom)
        }
        Variant::Tagged(t) => {
            let h = fnv1a_seeded(fnv1a(kind_tag), t.tag);
            fnv1a_seeded(h, &value_hash(t.value).to_le_bytes())
        }
        Variant::List(items) | Variant::Vector(items) => {
            let mut h = fnv1a(kind_tag);
            for item in items.iter() {
                h = fnv1a_seeded(h, &value_hash(item).to_le_bytes());
            }
            h
        }
        Variant::Set(items) => {
            // XOR-fold element hashes so membership order does not affect
            // the result.
            let mut acc = 0u64;
            for item in items.iter() {
                acc ^= value_hash(item);
            }
            fnv1a_seeded(fnv1a(kind_tag), &acc.to_le_bytes())
        }
        Variant::Map(entries) => {
            let mut acc = 0u64;
            for (k, v) in entries.iter() {
                let kh = value_hash(k);
                let vh = value_hash(v);
                acc ^= kh ^ vh.wrapping_mul(FNV_PRIME);
            }
            fnv1a_seeded(fnv1a(kind_tag), &acc.to_le_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::value::{SymbolRef, Value, Variant};

    fn int(arena: &Arena, n: i64) -> Value<'_> {
        Value::new(arena, Variant::Int(n))
    }

    #[test]
    fn reflexive_equality() {
        let arena = Arena::new();
        let v = int(&arena, 42);
        assert!(value_equal(&v, &v));
    }

    #[test]
    fn equal_values_hash_equal() {
        let arena = Arena::new();
        let a = int(&arena, 7);
        let b = int(&arena, 7);
        assert!(value_equal(&a, &b));
        assert_eq!(value_hash(&a), value_hash(&b));
    }

    #[test]
    fn nan_equals_nan() {
        let arena = Arena::new();
        let a = Value::new(&arena, Variant::Float(f64::NAN));
        let b = Value::new(&arena, Variant::Float(f64::NAN));
        assert!(value_equal(&a, &b));
    }

    #[test]
    fn positive_and_negative_zero_are_equal() {
        let arena = Arena::new();
        let a = Value::new(&arena, Variant::Float(0.0));
        let b = Value::new(&arena, Variant::Float(-0.0));
        assert!(value_equal(&a, &b));
    }

    #[test]
    fn raw_and_decoded_strings_are_not_equal() {
        use crate::value::StringRef;
        let arena = Arena::new();
        let raw = Value::new(&arena, Variant::String(StringRef::raw(b"a\\nb")));
        let decoded_text = arena.alloc_str("a\nb").unwrap();
        let decoded = Value::new(&arena, Variant::String(StringRef::with_decoded(b"a\\nb", decoded_text)));
        assert!(!value_equal(&raw, &decoded));
    }

    #[test]
    fn compare_zero_iff_equal_for_leaf_types() {
        let arena = Arena::new();
        let a = int(&arena, 5);
        let b = int(&arena, 5);
        let c = int(&arena, 6);
        assert_eq!(value_compare(&a, &b), Ordering::Equal);
        assert!(value_equal(&a, &b));
        assert_ne!(value_compare(&a, &c), Ordering::Equal);
        assert!(!value_equal(&a, &c));
    }

    #[test]
    fn bigdecimals_compare_structurally() {
        use crate::value::BigDecimalRef;
        let arena = Arena::new();
        let a = Value::new(&arena, Variant::BigDecimal(BigDecimalRef::new(false, b"1.50")));
        let b = Value::new(&arena, Variant::BigDecimal(BigDecimalRef::new(false, b"1.50")));
        let c = Value::new(&arena, Variant::BigDecimal(BigDecimalRef::new(false, b"1.51")));
        assert_eq!(value_compare(&a, &b), Ordering::Equal);
        assert!(value_equal(&a, &b));
        assert_ne!(value_compare(&a, &c), Ordering::Equal);
        assert!(!value_equal(&a, &c));
    }

    #[test]
    fn ratios_compare_structurally() {
        let arena = Arena::new();
        let a = Value::new(&arena, Variant::Ratio { numer: 2, denom: 3 });
        let b = Value::new(&arena, Variant::Ratio { numer: 2, denom: 3 });
        let c = Value::new(&arena, Variant::Ratio { numer: 1, denom: 3 });
        assert_eq!(value_compare(&a, &b), Ordering::Equal);
        assert!(value_equal(&a, &b));
        assert_ne!(value_compare(&a, &c), Ordering::Equal);
        assert!(!value_equal(&a, &c));
    }

    #[test]
    fn symbols_compare_by_namespace_then_name() {
        let arena = Arena::new();
        let a = Value::new(&arena, Variant::Symbol(SymbolRef::qualified(b"a", b"x")));
        let b = Value::new(&arena, Variant::Symbol(SymbolRef::qualified(b"b", b"x")));
        assert_eq!(value_compare(&a, &b), Ordering::Less);
    }
}
