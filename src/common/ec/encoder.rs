use num_traits::PrimInt;
use tracing::debug;

use super::{from_field, to_field, RSCodec};
use crate::common::{
    galois::{GaloisField, Gf},
    utils::{SymbolError, SymbolResult},
};

// Generator polynomial
//------------------------------------------------------------------------------

/// Product of (x - g^(i+fcr)) for i in 0..nsym
pub fn generator_poly(gf: &GaloisField, nsym: usize, fcr: u32) -> Vec<Gf> {
    let mut g = vec![1];
    for i in 0..nsym {
        g = gf.poly_mul(&g, &[1, gf.pow(gf.generator(), i as i64 + fcr as i64)]);
    }
    g
}

// Encoder
//------------------------------------------------------------------------------

impl RSCodec {
    /// Appends parity to every chunk of `nsize - nsym` symbols and concatenates the chunks.
    pub fn encode<T: PrimInt>(&self, data: &[T]) -> SymbolResult<Vec<T>> {
        let data = to_field(&self.gf, data)?;
        let chunk_size = self.nsize - self.nsym;

        let mut res = Vec::with_capacity(self.encoded_len(data.len()));
        for chunk in data.chunks(chunk_size) {
            res.extend(self.encode_msg(chunk)?);
        }
        debug!(len = data.len(), chunks = data.len().div_ceil(chunk_size), "Encoded message");

        from_field(&res)
    }

    // Extended synthetic division of msg * x^nsym by the generator polynomial. The remainder
    // is the parity.
    fn encode_msg(&self, msg: &[Gf]) -> SymbolResult<Vec<Gf>> {
        if msg.len() + self.nsym > self.gf.size() {
            return Err(SymbolError::MessageTooLong);
        }

        let len = msg.len();
        let mut res = msg.to_vec();
        res.resize(len + self.nsym, 0);

        for i in 0..len {
            let coef = res[i];
            if coef == 0 {
                continue;
            }
            for (u, &g) in res[i + 1..].iter_mut().zip(self.gen[1..].iter()) {
                *u ^= self.gf.mul(g, coef);
            }
        }

        res[..len].copy_from_slice(msg);
        Ok(res)
    }
}

#[cfg(test)]
mod encoder_tests {
    use super::generator_poly;
    use crate::common::{
        ec::{CodecParams, RSCodec},
        galois::GaloisField,
    };

    #[test]
    fn test_generator_poly() {
        let gf = GaloisField::new(8, None, 2).unwrap();
        let g = generator_poly(&gf, 4, 0);
        assert_eq!(g.len(), 5);
        for i in 0..4 {
            assert_eq!(gf.poly_eval(&g, gf.pow(2, i)), 0);
        }
    }

    #[test]
    fn test_regression_vector() {
        let rs = RSCodec::new(4).unwrap();
        let res = rs.encode(&[1u8, 2, 3, 4]).unwrap();
        assert_eq!(res, vec![1, 2, 3, 4, 117, 163, 178, 96]);
    }

    #[test]
    fn test_poly_mod_1() {
        let rs = RSCodec::new(10).unwrap();
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let res = rs.encode(msg).unwrap();
        assert_eq!(&res[..16], msg);
        assert_eq!(&res[16..], b"\xc4#'w\xeb\xd7\xe7\xe2]\x17");
    }

    #[test]
    fn test_poly_mod_2() {
        let rs = RSCodec::new(13).unwrap();
        let res = rs.encode(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec").unwrap();
        assert_eq!(&res[13..], b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10");
    }

    #[test]
    fn test_poly_mod_3() {
        let rs = RSCodec::new(18).unwrap();
        let res = rs.encode(b"CUF\x86W&U\xc2w2\x06\x12\x06g&").unwrap();
        assert_eq!(&res[15..], b"\xd5\xc7\x0b-s\xf7\xf1\xdf\xe5\xf8\x9au\x9aoV\xa1o'");
    }

    #[test]
    fn test_hello_world() {
        let rs = RSCodec::new(10).unwrap();
        let res = rs.encode(b"hello world").unwrap();
        assert_eq!(&res[11..], b"\xed%T\xc4\xfd\xfd\x89\xf3\xa8\xaa");
    }

    #[test]
    fn test_chunking() {
        let params = CodecParams { nsize: Some(20), ..Default::default() };
        let rs = RSCodec::with_params(4, params).unwrap();
        let data = (1..=40u8).collect::<Vec<_>>();
        let res = rs.encode(&data).unwrap();
        // 16 + 16 + 8 data symbols, each chunk with 4 parity symbols
        assert_eq!(res.len(), 52);
        assert_eq!(res.len(), rs.encoded_len(data.len()));
        assert_eq!(&res[..16], &data[..16]);
        assert_eq!(&res[20..36], &data[16..32]);
        assert_eq!(&res[40..48], &data[32..]);
    }

    #[test]
    fn test_empty() {
        let rs = RSCodec::new(4).unwrap();
        assert!(rs.encode::<u8>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_wide_field() {
        let params = CodecParams { c_exp: 10, ..Default::default() };
        let rs = RSCodec::with_params(6, params).unwrap();
        let res = rs.encode(&[1u16, 2, 3, 4, 500, 1000]).unwrap();
        assert_eq!(res, vec![1, 2, 3, 4, 500, 1000, 688, 690, 973, 153, 406, 216]);
    }

    #[test]
    fn test_parity_overflows_byte() {
        let params = CodecParams { c_exp: 10, ..Default::default() };
        let rs = RSCodec::with_params(6, params).unwrap();
        assert!(rs.encode(&[1u8, 2, 3, 4]).is_err());
    }
}
