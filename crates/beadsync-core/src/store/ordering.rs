//! Numeric-aware identifier ordering
//!
//! Identifiers are split into runs of digits and non-digits. Digit runs
//! compare by numeric value, so `bd-2` sorts before `bd-10`.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(id: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (idx, ch) in id.char_indices() {
        let digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(make_chunk(&id[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(make_chunk(&id[start..], digit));
    }
    out
}

const fn make_chunk(text: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(text)
    } else {
        Chunk::Text(text)
    }
}

fn compare_chunk(a: Chunk<'_>, b: Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(x), Chunk::Digits(y)) => {
            // Arbitrary length: compare without parsing.
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Chunk::Text(x), Chunk::Text(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
    }
}

/// Total order on identifiers with numeric runs compared by value.
///
/// Ties between differently written numbers (`a-01` vs `a-1`) fall back to
/// plain string order so the result stays total.
#[must_use]
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    left.iter()
        .zip(right.iter())
        .map(|(x, y)| compare_chunk(*x, *y))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| left.len().cmp(&right.len()))
        .then_with(|| a.cmp(b))
}
