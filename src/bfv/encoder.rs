//! SIMD batch encoding
//!
//! With t ≡ 1 (mod 2n), X^n + 1 splits into n linear factors modulo t and a
//! plaintext polynomial is a vector of n independent slots. Slots are laid
//! out as a 2 × (n/2) matrix: slot `i` of row 0 is the evaluation at
//! ζ^(3^i) and slot `i` of row 1 at ζ^(-3^i), for ζ a primitive 2n-th root of
//! unity mod t. Under this layout the Galois element 3 rotates both rows left
//! by one and 2n - 1 swaps the rows.

use crate::error::{Error, Result};
use crate::math::{ModQ, NttContext, Poly};
use crate::params::SchemeParameters;

use super::types::Plaintext;

/// Encodes vectors of integers mod t into batched plaintexts.
#[derive(Debug, Clone)]
pub struct BatchEncoder {
    n: usize,
    plain_modulus: u64,
    ntt: NttContext,
    /// Slot index -> NTT output position
    index_map: Vec<usize>,
}

impl BatchEncoder {
    pub fn new(params: &SchemeParameters) -> Self {
        let n = params.ring_degree;
        let t = params.plain_modulus;

        Self {
            n,
            plain_modulus: t,
            ntt: NttContext::with_moduli(n, &[t]),
            index_map: slot_index_map(n),
        }
    }

    /// Number of slots per plaintext
    pub fn slot_count(&self) -> usize {
        self.n
    }

    /// Encode `values` into the leading slots; remaining slots are zero.
    ///
    /// Fails with [`Error::InvalidInput`] if there are more values than slots
    /// or a value is not below t.
    pub fn encode(&self, values: &[u64]) -> Result<Plaintext> {
        if values.len() > self.n {
            return Err(Error::InvalidInput(format!(
                "vector of length {} exceeds slot capacity {}",
                values.len(),
                self.n
            )));
        }
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, &v)| v >= self.plain_modulus)
        {
            return Err(Error::InvalidInput(format!(
                "entry {i} = {v} is not below the plain modulus {}",
                self.plain_modulus
            )));
        }

        let mut evals = vec![0u64; self.n];
        for (&v, &pos) in values.iter().zip(&self.index_map) {
            evals[pos] = self.ntt.to_mont_at(v, 0);
        }
        self.ntt.inverse(&mut evals);

        Ok(Plaintext {
            poly: Poly::from_coeffs_moduli(evals, &[self.plain_modulus]),
        })
    }

    /// Slot values in [0, t), all slots in order.
    pub fn decode(&self, plain: &Plaintext) -> Vec<u64> {
        let mut evals = plain.coeffs().to_vec();
        self.ntt.forward(&mut evals);

        self.index_map
            .iter()
            .map(|&pos| self.ntt.from_mont_at(evals[pos], 0))
            .collect()
    }

    /// Slot values as centered integers: v ≥ (t + 1) / 2 maps to v - t.
    pub fn decode_signed(&self, plain: &Plaintext) -> Vec<i64> {
        let t = self.plain_modulus;
        self.decode(plain)
            .into_iter()
            .map(|v| {
                if v >= (t + 1) / 2 {
                    v as i64 - t as i64
                } else {
                    v as i64
                }
            })
            .collect()
    }
}

fn bit_reverse(x: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        x.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Position in the NTT output that holds each slot.
///
/// The forward transform puts a(ψ^(2·brv(j) + 1)) at position j, so the
/// evaluation at ψ^e lives at brv((e - 1) / 2).
fn slot_index_map(n: usize) -> Vec<usize> {
    let row = n / 2;
    let two_n = 2 * n as u64;
    let log_n = n.trailing_zeros();

    let mut map = vec![0usize; n];
    let mut pos = 1u64;
    for i in 0..row {
        map[i] = bit_reverse(((pos - 1) >> 1) as usize, log_n);
        map[row + i] = bit_reverse(((two_n - pos - 1) >> 1) as usize, log_n);
        pos = ModQ::mul(pos, 3, two_n);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfv::galois::apply_automorphism;

    fn test_params() -> SchemeParameters {
        SchemeParameters {
            ring_degree: 256,
            moduli: vec![1073738753, 1073732609],
            plain_modulus: 1047041,
            sigma: 3.2,
            gadget_base: 1 << 20,
            gadget_len: 3,
            version: 1,
        }
    }

    #[test]
    fn test_index_map_is_permutation() {
        let mut map = slot_index_map(256);
        map.sort_unstable();
        assert_eq!(map, (0..256).collect::<Vec<_>>());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let encoder = BatchEncoder::new(&test_params());
        let values: Vec<u64> = (0..256u64).map(|i| (i * 4099) % 1047041).collect();

        let plain = encoder.encode(&values).unwrap();
        assert_eq!(encoder.decode(&plain), values);
    }

    #[test]
    fn test_short_vector_is_zero_padded() {
        let encoder = BatchEncoder::new(&test_params());
        let plain = encoder.encode(&[1, 0, 0, 1]).unwrap();
        let decoded = encoder.decode(&plain);

        assert_eq!(&decoded[..4], &[1, 0, 0, 1]);
        assert!(decoded[4..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_constant_vector_encodes_constant_polynomial() {
        let encoder = BatchEncoder::new(&test_params());
        let plain = encoder.encode(&[5; 256]).unwrap();

        assert_eq!(plain.coeffs()[0], 5);
        assert!(plain.coeffs()[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_signed_decode() {
        let params = test_params();
        let t = params.plain_modulus;
        let encoder = BatchEncoder::new(&params);

        let plain = encoder.encode(&[t - 1, 3, (t + 1) / 2, (t - 1) / 2]).unwrap();
        let decoded = encoder.decode_signed(&plain);
        assert_eq!(decoded[0], -1);
        assert_eq!(decoded[1], 3);
        assert_eq!(decoded[2], -((t - 1) as i64) / 2);
        assert_eq!(decoded[3], ((t - 1) / 2) as i64);
    }

    #[test]
    fn test_rejects_oversized_and_out_of_range() {
        let params = test_params();
        let encoder = BatchEncoder::new(&params);

        assert!(matches!(
            encoder.encode(&vec![0; 257]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            encoder.encode(&[params.plain_modulus]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_galois_three_rotates_rows_left() {
        let encoder = BatchEncoder::new(&test_params());
        let row = 128;
        let values: Vec<u64> = (0..256u64).collect();

        let plain = encoder.encode(&values).unwrap();
        let rotated = Plaintext {
            poly: apply_automorphism(&plain.poly, 3),
        };
        let decoded = encoder.decode(&rotated);

        for i in 0..row {
            assert_eq!(decoded[i], values[(i + 1) % row]);
            assert_eq!(decoded[row + i], values[row + (i + 1) % row]);
        }
    }

    #[test]
    fn test_galois_minus_one_swaps_rows() {
        let encoder = BatchEncoder::new(&test_params());
        let row = 128;
        let values: Vec<u64> = (0..256u64).map(|i| i * 3 + 1).collect();

        let plain = encoder.encode(&values).unwrap();
        let swapped = Plaintext {
            poly: apply_automorphism(&plain.poly, 2 * 256 - 1),
        };
        let decoded = encoder.decode(&swapped);

        assert_eq!(&decoded[..row], &values[row..]);
        assert_eq!(&decoded[row..], &values[..row]);
    }
}
