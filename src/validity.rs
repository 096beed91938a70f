//! Decoding of dependent-entry valid-for data into controlling ordinals.
//!
//! A dependent field may be valid for several controlling values. The union
//! computed here is a *may-be-required* signal: a controlling ordinal is in the
//! set if at least one entry of the dependent field is restricted to it.

use crate::metadata::{DependentEntry, DependentPicklistField, ValidFor};
use ahash::AHashSet;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Strategy for turning one entry's valid-for data into controlling ordinals.
///
/// Swap in a custom implementation when a host encodes valid-for data
/// differently from the defaults.
pub trait ValidityDecoder {
    fn decode(&self, entry: &DependentEntry) -> AHashSet<usize>;
}

/// Passes decoded ordinals through and decodes base64 bitmaps.
///
/// Bit `i` of the bitmap maps to controlling ordinal `i`, read
/// most-significant-bit first within each byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidityDecoder;

impl ValidityDecoder for DefaultValidityDecoder {
    fn decode(&self, entry: &DependentEntry) -> AHashSet<usize> {
        match &entry.valid_for {
            ValidFor::Ordinals(ordinals) => ordinals.iter().copied().collect(),
            ValidFor::Bitmask(encoded) => match STANDARD.decode(encoded) {
                Ok(bytes) => decode_bitmap(&bytes),
                Err(e) => {
                    tracing::warn!(
                        value = %entry.value,
                        error = %e,
                        "Ignoring undecodable validFor bitmap"
                    );
                    AHashSet::new()
                }
            },
        }
    }
}

/// Set bit positions of a raw bitmap, MSB-first per byte.
pub fn decode_bitmap(bytes: &[u8]) -> AHashSet<usize> {
    bytes
        .iter()
        .enumerate()
        .flat_map(|(byte_idx, byte)| {
            (0..8)
                .filter(move |bit| (*byte & (0x80u8 >> bit)) != 0)
                .map(move |bit| byte_idx * 8 + bit)
        })
        .collect()
}

/// Inverse of [`decode_bitmap`], used by hosts and tools that produce bitmaps.
pub fn encode_bitmap<I: IntoIterator<Item = usize>>(ordinals: I) -> String {
    let mut bytes: Vec<u8> = Vec::new();
    for ordinal in ordinals {
        let byte_idx = ordinal / 8;
        if bytes.len() <= byte_idx {
            bytes.resize(byte_idx + 1, 0);
        }
        bytes[byte_idx] |= 0x80u8 >> (ordinal % 8);
    }
    STANDARD.encode(bytes)
}

/// Union of controlling ordinals across every entry of `field`.
pub fn valid_ordinals(
    decoder: &dyn ValidityDecoder,
    field: &DependentPicklistField,
) -> AHashSet<usize> {
    field
        .entries
        .iter()
        .flat_map(|entry| decoder.decode(entry))
        .collect()
}

