use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use tracing::debug;

use super::utils::{SymbolError, SymbolResult};

/// Field element of GF(2^c). Wide enough for every supported exponent.
pub type Gf = u16;

pub const DEFAULT_PRIM: u32 = 0x11d;
pub const DEFAULT_GENERATOR: Gf = 2;
pub const MIN_FIELD_EXP: u32 = 2;
pub const MAX_FIELD_EXP: u32 = 16;

// Galois field with log & antilog tables
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub struct GaloisField {
    c_exp: u32,
    prim: u32,
    generator: Gf,
    // Number of nonzero elements, 2^c - 1
    size: usize,
    exp: Vec<Gf>,
    log: Vec<Gf>,
}

impl GaloisField {
    /// Builds the tables for GF(2^c_exp). Without an explicit primitive polynomial, 0x11d is used
    /// for c_exp = 8 and the smallest suitable prime candidate is searched for otherwise.
    pub fn new(c_exp: u32, prim: Option<u32>, generator: Gf) -> SymbolResult<Self> {
        if !(MIN_FIELD_EXP..=MAX_FIELD_EXP).contains(&c_exp) {
            return Err(SymbolError::InvalidFieldExponent);
        }
        let size = (1usize << c_exp) - 1;
        if generator == 0 || generator as usize > size {
            return Err(SymbolError::SymbolOutOfField);
        }

        let prim = match prim {
            Some(p) => p,
            None if c_exp == 8 => DEFAULT_PRIM,
            None => *find_prime_polys(generator, c_exp, true)
                .first()
                .ok_or(SymbolError::PrimitivePolyNotFound)?,
        };
        if !is_full_cycle(prim, generator, c_exp) {
            return Err(SymbolError::PrimitivePolyNotFound);
        }

        let mut exp = vec![0; size * 2];
        let mut log = vec![0; size + 1];
        let mut x = 1u32;
        for i in 0..size {
            exp[i] = x as Gf;
            log[x as usize] = i as Gf;
            x = mult_no_lut(x, generator as u32, prim, 1 << c_exp);
        }
        for i in size..size * 2 {
            exp[i] = exp[i - size];
        }

        debug!(c_exp, prim, generator, "Built Galois field tables");
        Ok(Self { c_exp, prim, generator, size, exp, log })
    }

    /// Returns tables shared by every codec using the same parameters. Construction happens once
    /// under a lock and the immutable result is reused afterwards.
    pub fn shared(c_exp: u32, prim: Option<u32>, generator: Gf) -> SymbolResult<Arc<Self>> {
        static FIELDS: OnceLock<Mutex<HashMap<(u32, Option<u32>, Gf), Arc<GaloisField>>>> =
            OnceLock::new();

        let fields = FIELDS.get_or_init(|| Mutex::new(HashMap::new()));
        let mut fields = fields.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(gf) = fields.get(&(c_exp, prim, generator)) {
            return Ok(Arc::clone(gf));
        }
        let gf = Arc::new(Self::new(c_exp, prim, generator)?);
        fields.insert((c_exp, prim, generator), Arc::clone(&gf));
        Ok(gf)
    }

    pub fn c_exp(&self) -> u32 {
        self.c_exp
    }

    pub fn prim(&self) -> u32 {
        self.prim
    }

    pub fn generator(&self) -> Gf {
        self.generator
    }

    /// Count of nonzero elements (2^c - 1), which is also the largest element value.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, x: Gf) -> bool {
        (x as usize) <= self.size
    }
}

// Element arithmetic
//------------------------------------------------------------------------------

impl GaloisField {
    #[inline]
    pub fn add(&self, a: Gf, b: Gf) -> Gf {
        a ^ b
    }

    #[inline]
    pub fn sub(&self, a: Gf, b: Gf) -> Gf {
        a ^ b
    }

    #[inline]
    pub fn mul(&self, a: Gf, b: Gf) -> Gf {
        if a == 0 || b == 0 {
            return 0;
        }
        self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
    }

    pub fn div(&self, a: Gf, b: Gf) -> SymbolResult<Gf> {
        if b == 0 {
            return Err(SymbolError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }
        let idx = (self.log[a as usize] as usize + self.size - self.log[b as usize] as usize)
            % self.size;
        Ok(self.exp[idx])
    }

    /// `a^n` through the log table. Negative powers wrap around the multiplicative group.
    #[inline]
    pub fn pow(&self, a: Gf, n: i64) -> Gf {
        let idx = (self.log[a as usize] as i64 * n).rem_euclid(self.size as i64);
        self.exp[idx as usize]
    }

    #[inline]
    pub fn inverse(&self, a: Gf) -> Gf {
        self.exp[self.size - self.log[a as usize] as usize]
    }
}


// Polynomials
//------------------------------------------------------------------------------
// Coefficients are stored highest degree first.

impl GaloisField {
    pub fn poly_scale(&self, p: &[Gf], x: Gf) -> Vec<Gf> {
        p.iter().map(|&c| self.mul(c, x)).collect()
    }

    pub fn poly_add(&self, p: &[Gf], q: &[Gf]) -> Vec<Gf> {
        let len = p.len().max(q.len());
        let mut r = vec![0; len];
        r[len - p.len()..].copy_from_slice(p);
        for (i, &c) in q.iter().enumerate() {
            r[i + len - q.len()] ^= c;
        }
        r
    }

    pub fn poly_mul(&self, p: &[Gf], q: &[Gf]) -> Vec<Gf> {
        let mut r = vec![0; p.len() + q.len() - 1];
        for (j, &qj) in q.iter().enumerate() {
            if qj == 0 {
                continue;
            }
            for (i, &pi) in p.iter().enumerate() {
                r[i + j] ^= self.mul(pi, qj);
            }
        }
        r
    }

    /// Horner evaluation
    pub fn poly_eval(&self, p: &[Gf], x: Gf) -> Gf {
        let mut y = p[0];
        for &c in &p[1..] {
            y = self.mul(y, x) ^ c;
        }
        y
    }
}


// Primitive polynomial search
//------------------------------------------------------------------------------

/// Carry-less Russian peasant multiplication reduced by `prim`.
pub(crate) fn mult_no_lut(mut x: u32, mut y: u32, prim: u32, field_charac_full: u32) -> u32 {
    let mut r = 0;
    while y > 0 {
        if y & 1 == 1 {
            r ^= x;
        }
        y >>= 1;
        x <<= 1;
        if prim > 0 && x & field_charac_full != 0 {
            x ^= prim;
        }
    }
    r
}

fn is_full_cycle(prim: u32, generator: Gf, c_exp: u32) -> bool {
    let size = (1usize << c_exp) - 1;
    let mut seen = vec![false; size + 1];
    let mut x = 1u32;
    for _ in 0..size {
        x = mult_no_lut(x, generator as u32, prim, 1 << c_exp);
        if x as usize > size || seen[x as usize] {
            return false;
        }
        seen[x as usize] = true;
    }
    true
}

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Candidates are the primes between 2^c - 1 and 2^(c+1) - 1, ascending. A candidate is kept
/// when the generator walks through every nonzero element before repeating.
pub fn find_prime_polys(generator: Gf, c_exp: u32, single: bool) -> Vec<u32> {
    let field_charac = (1u32 << c_exp) - 1;
    let field_charac_next = (1u32 << (c_exp + 1)) - 1;

    let mut res = Vec::new();
    for prim in (field_charac + 1..field_charac_next).filter(|&p| is_prime(p)) {
        if is_full_cycle(prim, generator, c_exp) {
            res.push(prim);
            if single {
                break;
            }
        }
    }
    res
}
