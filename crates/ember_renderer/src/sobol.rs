//! Sobol low-discrepancy sequences.
//!
//! [`SobolTable`] holds the direction numbers for a fixed number of
//! dimensions and is shared read-only by every render task. A
//! [`SobolSequence`] is a cheap view over a run of consecutive dimensions
//! with its own per-dimension point indices.

use rand::rngs::StdRng;
use rand::RngCore;

use crate::material::ShadeSampler;

/// Bits per direction number.
pub const SOBOL_BITS: usize = 32;

/// Most dimensions a single sequence view can address.
pub const MAX_SEQUENCE_DIMENSIONS: usize = 10;

/// Leading points skipped in every dimension.
const OFFSET: u32 = 64;

/// Direction numbers for `dimensions` Sobol dimensions.
#[derive(Debug, Clone)]
pub struct SobolTable {
    dimensions: usize,
    vectors: Vec<u32>,
}

impl SobolTable {
    /// Build direction numbers.
    ///
    /// Dimension 0 is the van der Corput sequence. Every further dimension
    /// takes the next primitive polynomial over GF(2), in order of increasing
    /// degree, with odd initial direction numbers derived from a fixed hash.
    pub fn new(dimensions: usize) -> Self {
        let mut vectors = vec![0u32; dimensions * SOBOL_BITS];
        let mut polynomials = PrimitivePolynomials::default();

        for dim in 0..dimensions {
            let v = &mut vectors[dim * SOBOL_BITS..(dim + 1) * SOBOL_BITS];
            if dim == 0 {
                for (i, value) in v.iter_mut().enumerate() {
                    *value = 1 << (31 - i);
                }
                continue;
            }

            let (degree, poly) = polynomials.next_polynomial();
            // Interior coefficients a_1..a_{s-1}, a_1 in the highest bit
            let a = (poly >> 1) & ((1 << (degree - 1)) - 1);
            let s = degree as usize;

            for i in 0..s.min(SOBOL_BITS) {
                let m = initial_direction(dim, i);
                v[i] = m << (31 - i);
            }
            for i in s..SOBOL_BITS {
                let mut value = v[i - s] ^ (v[i - s] >> s);
                for k in 1..s {
                    if (a >> (s - 1 - k)) & 1 == 1 {
                        value ^= v[i - k];
                    }
                }
                v[i] = value;
            }
        }

        Self {
            dimensions,
            vectors,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Raw 32-bit Sobol point `index` in `dimension`.
    pub fn point(&self, dimension: usize, index: u32) -> u32 {
        let v = &self.vectors[dimension * SOBOL_BITS..(dimension + 1) * SOBOL_BITS];
        let mut result = 0;
        let mut i = index;
        let mut j = 0;
        while i > 0 {
            if i & 1 == 1 {
                result ^= v[j];
            }
            i >>= 1;
            j += 1;
        }
        result
    }
}

/// Odd `m_i < 2^(i+1)` for the initial direction numbers.
fn initial_direction(dim: usize, i: usize) -> u32 {
    let hash = splitmix64((dim as u64) << 32 | i as u64);
    let range = 1u64 << (i + 1);
    ((hash % range) as u32) | 1
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Enumerates primitive polynomials over GF(2) by increasing degree.
///
/// Polynomials are bit masks: bit `k` is the coefficient of `x^k`.
#[derive(Debug, Default)]
struct PrimitivePolynomials {
    degree: u32,
    next: u32,
}

impl PrimitivePolynomials {
    fn next_polynomial(&mut self) -> (u32, u32) {
        loop {
            if self.degree == 0 || self.next >= 1 << (self.degree + 1) {
                self.degree += 1;
                self.next = (1 << self.degree) | 1;
            }
            let candidate = self.next;
            self.next += 2;
            if is_primitive(candidate, self.degree) {
                return (self.degree, candidate);
            }
        }
    }
}

/// True if `x` has multiplicative order `2^degree - 1` modulo `poly`.
fn is_primitive(poly: u32, degree: u32) -> bool {
    let period = (1u32 << degree) - 1;
    let top = 1u32 << degree;
    let mut state = 1u32;
    for step in 1..=period {
        state <<= 1;
        if state & top != 0 {
            state ^= poly;
        }
        if state == 1 {
            return step == period;
        }
    }
    false
}

/// A view over `len` consecutive dimensions starting at `start`.
///
/// Each dimension keeps its own index; reading a dimension returns its
/// next point.
#[derive(Debug, Clone)]
pub struct SobolSequence<'a> {
    table: &'a SobolTable,
    start: usize,
    indices: [u32; MAX_SEQUENCE_DIMENSIONS],
    len: usize,
}

impl<'a> SobolSequence<'a> {
    /// All dimensions start at point `first_index`.
    pub fn new(table: &'a SobolTable, start: usize, len: usize, first_index: u32) -> Self {
        debug_assert!(len <= MAX_SEQUENCE_DIMENSIONS);
        debug_assert!(start + len <= table.dimensions());
        Self {
            table,
            start,
            indices: [first_index; MAX_SEQUENCE_DIMENSIONS],
            len: len.min(MAX_SEQUENCE_DIMENSIONS),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Next raw 32-bit point in dimension `d` of this view.
    pub fn next_u32(&mut self, d: usize) -> u32 {
        let index = self.indices[d].wrapping_add(OFFSET);
        self.indices[d] = self.indices[d].wrapping_add(1);
        self.table.point(self.start + d, index)
    }

    /// Next point in `[0, 1)` in dimension `d` of this view.
    pub fn get(&mut self, d: usize) -> f32 {
        (self.next_u32(d) >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }
}

/// Random source that walks a Sobol view one dimension per draw.
///
/// Once every dimension of the current bounce is used, draws fall back to
/// the pseudo-random generator. [`ShadeSampler::begin_bounce`] rewinds to
/// the first dimension.
pub struct SobolStream<'a, 'r> {
    sequence: SobolSequence<'a>,
    cursor: usize,
    fallback: &'r mut StdRng,
}

impl<'a, 'r> SobolStream<'a, 'r> {
    pub fn new(sequence: SobolSequence<'a>, fallback: &'r mut StdRng) -> Self {
        Self {
            sequence,
            cursor: 0,
            fallback,
        }
    }
}

impl RngCore for SobolStream<'_, '_> {
    fn next_u32(&mut self) -> u32 {
        if self.cursor < self.sequence.len() {
            let value = self.sequence.next_u32(self.cursor);
            self.cursor += 1;
            value
        } else {
            self.fallback.next_u32()
        }
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        hi << 32 | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl ShadeSampler for SobolStream<'_, '_> {
    fn begin_bounce(&mut self) {
        self.cursor = 0;
    }
}
