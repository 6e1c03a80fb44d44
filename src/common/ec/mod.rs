mod decoder;
mod encoder;

use std::sync::Arc;

use num_traits::{NumCast, PrimInt};

pub use decoder::Decoded;
pub use encoder::generator_poly;

use super::{
    galois::{GaloisField, Gf, DEFAULT_GENERATOR},
    utils::{SymbolError, SymbolResult},
};

pub const DEFAULT_CHUNK_SIZE: usize = 255;

// Codec parameters
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    /// Field exponent c of GF(2^c)
    pub c_exp: u32,
    /// Primitive polynomial. Searched for when absent and c != 8.
    pub prim: Option<u32>,
    pub generator: Gf,
    /// First consecutive root
    pub fcr: u32,
    /// Maximum chunk length, parity included. Defaults to the field size.
    pub nsize: Option<usize>,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self { c_exp: 8, prim: None, generator: DEFAULT_GENERATOR, fcr: 0, nsize: None }
    }
}

// Reed-Solomon codec
//------------------------------------------------------------------------------

/// Systematic Reed-Solomon encoder/decoder. Long messages are split into chunks of at most
/// `nsize` symbols, each carrying its own `nsym` parity symbols.
#[derive(Debug, Clone)]
pub struct RSCodec {
    gf: Arc<GaloisField>,
    nsym: usize,
    nsize: usize,
    fcr: u32,
    gen: Vec<Gf>,
}

impl RSCodec {
    pub fn new(nsym: usize) -> SymbolResult<Self> {
        Self::with_params(nsym, CodecParams::default())
    }

    pub fn with_params(nsym: usize, params: CodecParams) -> SymbolResult<Self> {
        let mut c_exp = params.c_exp;
        if let Some(nsize) = params.nsize {
            if nsize > DEFAULT_CHUNK_SIZE && c_exp <= 8 {
                // Smallest field holding the requested chunk size
                c_exp = usize::BITS - nsize.leading_zeros();
            }
        }

        let gf = GaloisField::shared(c_exp, params.prim, params.generator)?;
        let nsize = params.nsize.unwrap_or(gf.size());
        if nsize > gf.size() {
            return Err(SymbolError::InvalidChunkSize);
        }
        if nsym == 0 || nsym >= nsize {
            return Err(SymbolError::InvalidEccSymbols);
        }

        let gen = generator_poly(&gf, nsym, params.fcr);
        Ok(Self { gf, nsym, nsize, fcr: params.fcr, gen })
    }

    pub fn nsym(&self) -> usize {
        self.nsym
    }

    pub fn nsize(&self) -> usize {
        self.nsize
    }

    pub fn fcr(&self) -> u32 {
        self.fcr
    }

    pub fn field(&self) -> &Arc<GaloisField> {
        &self.gf
    }

    pub fn generator_poly(&self) -> &[Gf] {
        &self.gen
    }

    /// Length of the encoding of a `msg_len` symbol message.
    pub fn encoded_len(&self, msg_len: usize) -> usize {
        msg_len + self.nsym * msg_len.div_ceil(self.nsize - self.nsym)
    }

    /// Longest message whose encoding fits in `codeword_len` symbols.
    pub fn message_budget(&self, codeword_len: usize) -> usize {
        let full = codeword_len / self.nsize;
        let rem = codeword_len % self.nsize;
        full * (self.nsize - self.nsym) + rem.saturating_sub(self.nsym)
    }

    /// Singleton bound report. With neither argument, returns the independent maxima of errors
    /// and erasures. With one of them, returns how many of the other can be corrected alongside.
    pub fn max_errata(
        &self,
        errors: Option<usize>,
        erasures: Option<usize>,
    ) -> SymbolResult<(usize, usize)> {
        let nsym = self.nsym;
        if let Some(erasures) = erasures {
            if erasures > nsym {
                return Err(SymbolError::TooManyErasures);
            }
            return Ok(((nsym - erasures) / 2, erasures));
        }
        if let Some(errors) = errors {
            if errors > nsym / 2 {
                return Err(SymbolError::TooManyErrors);
            }
            return Ok((errors, nsym - errors * 2));
        }
        Ok((nsym / 2, nsym))
    }
}

// Symbol conversions between caller integers and field elements
//------------------------------------------------------------------------------

fn to_field<T: PrimInt>(gf: &GaloisField, data: &[T]) -> SymbolResult<Vec<Gf>> {
    data.iter()
        .map(|x| x.to_u16().filter(|&g| gf.contains(g)).ok_or(SymbolError::SymbolOutOfField))
        .collect()
}

fn from_field<T: PrimInt>(data: &[Gf]) -> SymbolResult<Vec<T>> {
    data.iter().map(|&g| <T as NumCast>::from(g).ok_or(SymbolError::SymbolOutOfField)).collect()
}

#[cfg(test)]
mod codec_tests {
    use super::{CodecParams, RSCodec};
    use crate::common::utils::SymbolError;
    use test_case::test_case;

    #[test_case(0)]
    #[test_case(255)]
    #[test_case(300)]
    fn test_invalid_nsym(nsym: usize) {
        assert_eq!(RSCodec::new(nsym).unwrap_err(), SymbolError::InvalidEccSymbols);
    }

    #[test]
    fn test_chunk_size_selects_field() {
        let params = CodecParams { nsize: Some(1023), ..Default::default() };
        let rs = RSCodec::with_params(10, params).unwrap();
        assert_eq!(rs.field().c_exp(), 10);
        assert_eq!(rs.field().prim(), 1033);
        assert_eq!(rs.nsize(), 1023);
    }

    #[test]
    fn test_chunk_size_too_large() {
        let params = CodecParams { c_exp: 4, nsize: Some(20), ..Default::default() };
        assert_eq!(RSCodec::with_params(4, params).unwrap_err(), SymbolError::InvalidChunkSize);
    }

    #[test]
    fn test_budget_matches_encoded_len() {
        let rs = RSCodec::new(10).unwrap();
        assert_eq!(rs.message_budget(140), 130);
        assert_eq!(rs.encoded_len(130), 140);
        assert_eq!(rs.message_budget(10), 0);
        for cw in 0..800 {
            let m = rs.message_budget(cw);
            assert!(rs.encoded_len(m) <= cw);
            assert!(rs.encoded_len(m + 1) > cw);
        }
    }

    #[test]
    fn test_max_errata() {
        let rs = RSCodec::new(10).unwrap();
        assert_eq!(rs.max_errata(None, None), Ok((5, 10)));
        assert_eq!(rs.max_errata(None, Some(4)), Ok((3, 4)));
        assert_eq!(rs.max_errata(Some(2), None), Ok((2, 6)));
        assert_eq!(rs.max_errata(Some(6), None), Err(SymbolError::TooManyErrors));
        assert_eq!(rs.max_errata(None, Some(11)), Err(SymbolError::TooManyErasures));
    }
}
