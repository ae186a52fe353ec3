use crate::graph::Unitig;
use crate::types::ColortigError;
use fxhash::FxHashMap;

/// Check that a sequence only contains symbols the traversal understands.
pub fn check_alphabet(name: &str, seq: &str) -> Result<(), ColortigError> {
    for &b in seq.as_bytes() {
        match b {
            b'A' | b'C' | b'G' | b'T' | b'N' => {}
            _ => {
                return Err(ColortigError::MalformedSequence {
                    name: name.to_string(),
                    symbol: b as char,
                })
            }
        }
    }
    Ok(())
}

fn complement(b: u8) -> Option<u8> {
    match b {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'C' => Some(b'G'),
        b'G' => Some(b'C'),
        b'N' => Some(b'N'),
        _ => None,
    }
}

pub fn reverse_complement(seq: &str) -> Result<String, ColortigError> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.as_bytes().iter().rev() {
        match complement(b) {
            Some(c) => out.push(c),
            None => {
                return Err(ColortigError::MalformedSequence {
                    name: String::new(),
                    symbol: b as char,
                })
            }
        }
    }
    // the input was ASCII, so the complement is too
    Ok(String::from_utf8(out).expect("complement of ASCII is ASCII"))
}

/// The sequence of a unitig as it is emitted: stored bases if the strand bit
/// says the stored orientation is canonical, reverse complement otherwise.
/// Sequences are validated before traversal starts, so this cannot fail.
pub fn oriented_sequence(unitig: &Unitig) -> String {
    if unitig.strand {
        unitig.seq.clone()
    } else {
        reverse_complement(&unitig.seq).expect("unitig sequences are validated before traversal")
    }
}

/// Dinucleotide Shannon entropy of a sequence, normalized to [0, 1] by the
/// maximum of 4 bits over 16 dimers. Dimers containing 'N' are skipped.
pub fn entropy(seq: &str) -> f64 {
    let bytes = seq.as_bytes();
    if bytes.len() < 2 {
        return 0.0;
    }
    let mut counts: FxHashMap<(u8, u8), usize> = FxHashMap::default();
    let mut total = 0usize;
    for w in bytes.windows(2) {
        if w[0] != b'N' && w[1] != b'N' {
            *counts.entry((w[0], w[1])).or_insert(0) += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    let mut h = 0.0;
    for &count in counts.values() {
        let p = count as f64 / total as f64;
        h -= p * p.log2();
    }
    h / 4.0
}
