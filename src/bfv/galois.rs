//! Galois automorphisms for BFV
//!
//! τ_g: R → R, τ_g(X) = X^g for odd g. Over the batch slot matrix, g = 3^k
//! rotates both rows left by k and g = 2n - 1 swaps the rows.

use crate::math::{ModQ, Poly};

/// Apply Galois automorphism τ_g to a coefficient-domain polynomial
///
/// X^i maps to X^(g·i mod 2n), negated when g·i mod 2n ≥ n since X^n = -1.
/// Works limb by limb, so it applies equally to R_Q and to plaintexts mod t.
pub fn apply_automorphism(poly: &Poly, g: usize) -> Poly {
    assert!(!poly.is_ntt(), "automorphism expects coefficient domain");
    debug_assert!(g % 2 == 1, "Galois element must be odd");

    let d = poly.dimension();
    let two_d = 2 * d;
    let mut result = vec![0u64; poly.coeffs().len()];

    for (l, &q) in poly.moduli().iter().enumerate() {
        let src = poly.limb(l);
        let dst = &mut result[l * d..(l + 1) * d];
        for (i, &coeff) in src.iter().enumerate() {
            let new_idx = (g * i) % two_d;
            if new_idx < d {
                dst[new_idx] = ModQ::add(dst[new_idx], coeff, q);
            } else {
                dst[new_idx - d] = ModQ::sub(dst[new_idx - d], coeff, q);
            }
        }
    }

    Poly::from_coeffs_moduli(result, poly.moduli())
}

/// Galois element that rotates slot rows by `step` (positive = left)
pub fn galois_element_for_step(step: isize, d: usize) -> usize {
    let row = (d / 2) as isize;
    let k = step.rem_euclid(row) as u64;
    ModQ::pow(3, k, 2 * d as u64) as usize
}

/// Galois element that swaps the two slot rows
pub fn row_swap_element(d: usize) -> usize {
    2 * d - 1
}

/// Default rotation key set: steps ±2^k for every power of two below the
/// row length, plus the row swap. Ascending, without duplicates.
pub fn galois_elements(d: usize) -> Vec<usize> {
    let row = d / 2;
    let mut elements: Vec<usize> = std::iter::successors(Some(1usize), |s| Some(s * 2))
        .take_while(|&s| s < row)
        .flat_map(|s| {
            [
                galois_element_for_step(s as isize, d),
                galois_element_for_step(-(s as isize), d),
            ]
        })
        .collect();
    elements.push(row_swap_element(d));
    elements.sort_unstable();
    elements.dedup();
    elements
}
