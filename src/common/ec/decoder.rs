use num_traits::PrimInt;
use tracing::debug;

use super::{from_field, to_field, RSCodec};
use crate::common::{
    galois::Gf,
    utils::{SymbolError, SymbolResult},
};

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Corrected message symbols, parity stripped
    pub message: Vec<T>,
    /// Corrected codeword, parity included
    pub codeword: Vec<T>,
    /// Positions within the input that were erased or found in error
    pub errata: Vec<usize>,
}

// Decoder
//------------------------------------------------------------------------------

impl RSCodec {
    /// Corrects up to `nsym` errata per chunk, where an error counts twice and an erasure once.
    /// `erase_pos` holds known-bad positions within `data`.
    pub fn decode<T: PrimInt>(&self, data: &[T], erase_pos: &[usize]) -> SymbolResult<Decoded<T>> {
        let data = to_field(&self.gf, data)?;

        let mut message = Vec::with_capacity(data.len());
        let mut codeword = Vec::with_capacity(data.len());
        let mut errata = Vec::new();
        for (i, chunk) in data.chunks(self.nsize).enumerate() {
            let offset = i * self.nsize;
            let mut local = erase_pos
                .iter()
                .filter(|&&p| p >= offset && p < offset + chunk.len())
                .map(|&p| p - offset)
                .collect::<Vec<_>>();
            local.sort_unstable();
            local.dedup();

            let (fixed, chunk_errata) = self.correct_msg(chunk, &local)?;
            message.extend_from_slice(&fixed[..fixed.len() - self.nsym]);
            codeword.extend_from_slice(&fixed);
            errata.extend(chunk_errata.iter().map(|p| p + offset));
        }
        debug!(len = data.len(), errata = errata.len(), "Decoded message");

        Ok(Decoded { message: from_field(&message)?, codeword: from_field(&codeword)?, errata })
    }

    /// Whether each chunk of `data` is a valid codeword
    pub fn check<T: PrimInt>(&self, data: &[T]) -> SymbolResult<Vec<bool>> {
        let data = to_field(&self.gf, data)?;
        Ok(data.chunks(self.nsize).map(|c| self.syndromes(c).iter().all(|&s| s == 0)).collect())
    }

    fn correct_msg(&self, msg: &[Gf], erase_pos: &[usize]) -> SymbolResult<(Vec<Gf>, Vec<usize>)> {
        if msg.len() > self.gf.size() {
            return Err(SymbolError::MessageTooLong);
        }
        // A trailing chunk must at least carry its parity plus one data symbol
        if msg.len() <= self.nsym {
            return Err(SymbolError::UncorrectableMessage);
        }
        if erase_pos.len() > self.nsym {
            return Err(SymbolError::TooManyErasures);
        }

        let mut msg = msg.to_vec();
        for &p in erase_pos {
            msg[p] = 0;
        }

        let synd = self.syndromes(&msg);
        if synd.iter().all(|&s| s == 0) {
            return Ok((msg, erase_pos.to_vec()));
        }

        let fsynd = self.forney_syndromes(&synd, erase_pos, msg.len());
        let err_loc = self.error_locator(&fsynd, erase_pos.len())?;
        let err_loc_rev = err_loc.iter().rev().copied().collect::<Vec<_>>();
        let err_pos = self.chien_search(&err_loc_rev, msg.len())?;

        let mut errata = erase_pos.to_vec();
        errata.extend(err_pos);
        self.correct_errata(&mut msg, &synd, &errata)?;

        if self.syndromes(&msg).iter().any(|&s| s != 0) {
            return Err(SymbolError::UncorrectableMessage);
        }
        Ok((msg, errata))
    }

    // Leading zero keeps the syndrome polynomial aligned with the evaluator computation
    fn syndromes(&self, msg: &[Gf]) -> Vec<Gf> {
        let g = self.gf.generator();
        let mut synd = Vec::with_capacity(self.nsym + 1);
        synd.push(0);
        for i in 0..self.nsym {
            synd.push(self.gf.poly_eval(msg, self.gf.pow(g, i as i64 + self.fcr as i64)));
        }
        synd
    }

    // Strips erasure contribution so Berlekamp-Massey only searches for errors
    fn forney_syndromes(&self, synd: &[Gf], erase_pos: &[usize], nmess: usize) -> Vec<Gf> {
        let mut fsynd = synd[1..].to_vec();
        for &p in erase_pos {
            let x = self.gf.pow(self.gf.generator(), (nmess - 1 - p) as i64);
            for j in 0..fsynd.len() - 1 {
                fsynd[j] = self.gf.mul(fsynd[j], x) ^ fsynd[j + 1];
            }
        }
        fsynd
    }

    // Berlekamp-Massey
    fn error_locator(&self, synd: &[Gf], erase_count: usize) -> SymbolResult<Vec<Gf>> {
        let gf = &self.gf;
        let mut err_loc = vec![1];
        let mut old_loc = vec![1];
        let shift = synd.len().saturating_sub(self.nsym);

        for i in 0..self.nsym - erase_count {
            let k = i + shift;
            let mut delta = synd[k];
            for j in 1..err_loc.len().min(k + 1) {
                delta ^= gf.mul(err_loc[err_loc.len() - 1 - j], synd[k - j]);
            }

            old_loc.push(0);
            if delta != 0 {
                if old_loc.len() > err_loc.len() {
                    let new_loc = gf.poly_scale(&old_loc, delta);
                    old_loc = gf.poly_scale(&err_loc, gf.inverse(delta));
                    err_loc = new_loc;
                }
                err_loc = gf.poly_add(&err_loc, &gf.poly_scale(&old_loc, delta));
            }
        }

        if let Some(lead) = err_loc.iter().position(|&x| x != 0) {
            err_loc.drain(..lead);
        }
        let errs = err_loc.len() - 1;
        if errs * 2 + erase_count > self.nsym {
            return Err(SymbolError::TooManyErrors);
        }
        Ok(err_loc)
    }

    // Chien search over every position of the chunk
    fn chien_search(&self, err_loc: &[Gf], nmess: usize) -> SymbolResult<Vec<usize>> {
        let g = self.gf.generator();
        let err_pos = (0..nmess)
            .filter(|&i| self.gf.poly_eval(err_loc, self.gf.pow(g, i as i64)) == 0)
            .map(|i| nmess - 1 - i)
            .collect::<Vec<_>>();

        if err_pos.len() != err_loc.len() - 1 {
            return Err(SymbolError::LocatorMismatch);
        }
        Ok(err_pos)
    }

    // Forney algorithm
    fn correct_errata(&self, msg: &mut [Gf], synd: &[Gf], err_pos: &[usize]) -> SymbolResult<()> {
        let gf = &self.gf;
        let g = gf.generator();
        let coef_pos = err_pos.iter().map(|&p| msg.len() - 1 - p).collect::<Vec<_>>();

        // Errata locator
        let mut e_loc = vec![1];
        for &c in &coef_pos {
            e_loc = gf.poly_mul(&e_loc, &gf.poly_add(&[1], &[gf.pow(g, c as i64), 0]));
        }

        // Errata evaluator, kept in reversed coefficient order for evaluation at X^-1
        let synd_rev = synd.iter().rev().copied().collect::<Vec<_>>();
        let prod = gf.poly_mul(&synd_rev, &e_loc);
        let omega = &prod[prod.len() - e_loc.len()..];

        let size = gf.size() as i64;
        let x = coef_pos.iter().map(|&c| gf.pow(g, c as i64 - size)).collect::<Vec<_>>();

        for (i, &xi) in x.iter().enumerate() {
            let xi_inv = gf.inverse(xi);

            let prime = x
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(1, |acc, (_, &xj)| gf.mul(acc, 1 ^ gf.mul(xi_inv, xj)));
            if prime == 0 {
                return Err(SymbolError::ZeroErrorLocatorDerivative);
            }

            let y = gf.poly_eval(omega, xi_inv);
            let y = gf.mul(gf.pow(xi, 1 - self.fcr as i64), y);
            msg[err_pos[i]] ^= gf.div(y, prime)?;
        }
        Ok(())
    }
}
