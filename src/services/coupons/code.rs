//! Checksum-bearing coupon codes.
//!
//! A code is three parts of four symbols, e.g. `ABCT-123F-XYQV`. The last
//! symbol of every part is a checksum over the first three and the part's
//! position, so typos are caught before the store is queried. Input is
//! forgiving: case, separators and the look-alikes O/I/Z/S are normalised.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CouponError;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKLMNPQRTUVWXY";
const PARTS: usize = 3;
const PART_LEN: usize = 4;

static NOT_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Z]+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalises and verifies `raw`.
    pub fn parse(raw: &str) -> Result<Self, CouponError> {
        let upper = raw.to_ascii_uppercase();
        let symbols: Vec<u8> = NOT_ALPHANUMERIC
            .replace_all(&upper, "")
            .bytes()
            .map(|b| match b {
                b'O' => b'0',
                b'I' => b'1',
                b'Z' => b'2',
                b'S' => b'5',
                other => other,
            })
            .collect();

        if symbols.len() != PARTS * PART_LEN {
            return Err(CouponError::InvalidFormat);
        }

        let mut parts = Vec::with_capacity(PARTS);
        for (i, part) in symbols.chunks(PART_LEN).enumerate() {
            let mut indices = [0u32; PART_LEN];
            for (slot, symbol) in indices.iter_mut().zip(part) {
                *slot = symbol_index(*symbol).ok_or(CouponError::InvalidFormat)?;
            }
            let expected = checksum(&indices[..PART_LEN - 1], i + 1);
            if indices[PART_LEN - 1] != expected {
                return Err(CouponError::InvalidFormat);
            }
            // All bytes are from ALPHABET, so this is ASCII.
            parts.push(String::from_utf8_lossy(part).into_owned());
        }

        Ok(Self(parts.join("-")))
    }

    /// A fresh random code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let parts: Vec<String> = (1..=PARTS)
            .map(|position| {
                let data: Vec<u32> = (0..PART_LEN - 1)
                    .map(|_| rng.gen_range(0..ALPHABET.len() as u32))
                    .collect();
                let check = checksum(&data, position);
                data.iter()
                    .chain(std::iter::once(&check))
                    .map(|&i| ALPHABET[i as usize] as char)
                    .collect()
            })
            .collect();
        Self(parts.join("-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn symbol_index(symbol: u8) -> Option<u32> {
    ALPHABET
        .iter()
        .position(|&s| s == symbol)
        .map(|i| i as u32)
}

fn checksum(data: &[u32], position: usize) -> u32 {
    let check = data
        .iter()
        .fold(position as u32, |acc, &index| acc * 19 + index);
    check % 31
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CouponCode {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case("ABCT-123F-XYQV", "ABCT-123F-XYQV")]
    #[case("abct 123f xyqv", "ABCT-123F-XYQV")]
    #[case("ABCT123FXYQV", "ABCT-123F-XYQV")]
    #[case("K7RK-M2PI-9WT6", "K7RK-M2P1-9WT6")]
    #[case("55qa/hn87/cj3l", "55QA-HN87-CJ3L")]
    fn accepts_and_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(CouponCode::parse(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ABCT-123F")]
    #[case("ABCT-123F-XYQV-0000")]
    #[case("ABCT-123F-XYQW")]
    #[case("ABCD-1234-XYZQ")]
    #[case("BACT-123F-XYQV")]
    fn rejects_malformed(#[case] raw: &str) {
        assert_matches!(CouponCode::parse(raw), Err(CouponError::InvalidFormat));
    }

    #[test]
    fn generated_codes_parse_back() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = CouponCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), 14);
            assert_eq!(CouponCode::parse(code.as_str()).unwrap(), code);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn wrong_length_is_always_invalid(raw in "[0-9A-HJ-NPQR-Y]{0,11}|[0-9A-HJ-NPQR-Y]{13,20}") {
            prop_assert_eq!(CouponCode::parse(&raw), Err(CouponError::InvalidFormat));
        }

        #[test]
        fn a_single_changed_check_symbol_is_rejected(seed in any::<u64>(), part in 0usize..3, shift in 1u8..31) {
            let code = CouponCode::generate(&mut StdRng::seed_from_u64(seed));
            let mut bytes = code.as_str().as_bytes().to_vec();
            let pos = part * 5 + 3;
            let index = symbol_index(bytes[pos]).unwrap();
            // Checksums are mod 31; moving within the first 31 symbols always changes it.
            prop_assume!(index < 31);
            bytes[pos] = ALPHABET[((index + shift as u32) % 31) as usize];
            let tampered = String::from_utf8(bytes).unwrap();
            prop_assert_eq!(CouponCode::parse(&tampered), Err(CouponError::InvalidFormat));
        }
    }
}
