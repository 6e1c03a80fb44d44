use tracing::{debug, warn};

use super::{
    ec::{CodecParams, RSCodec},
    layout::Layout,
    metadata::SymbolConfig,
    utils::{SymbolError, SymbolResult},
};

// Payload codec
//------------------------------------------------------------------------------

/// Frames a payload into the codeword carried by one symbol and back. Builder and reader derive
/// the same instance from the same layout and configuration.
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    // None when error correction is disabled
    rs: Option<RSCodec>,
    field_exp: u32,
    msg_len: usize,
    codeword_len: usize,
}

impl PayloadCodec {
    pub fn new(layout: &Layout, config: &SymbolConfig) -> SymbolResult<Self> {
        let budget = layout.codeword_budget(config.ecc);
        let (rs, msg_len) = match config.ecc {
            0 => (None, budget),
            nsym => {
                let params = CodecParams { c_exp: config.field_exp, ..Default::default() };
                let rs = RSCodec::with_params(nsym, params)?;
                let msg_len = rs.message_budget(budget);
                (Some(rs), msg_len)
            }
        };
        if msg_len == 0 {
            return Err(SymbolError::CapacityExceeded);
        }

        let codeword_len = rs.as_ref().map_or(msg_len, |rs| rs.encoded_len(msg_len));
        debug!(budget, msg_len, codeword_len, "Sized payload");
        Ok(Self { rs, field_exp: config.field_exp, msg_len, codeword_len })
    }

    /// Payload bytes one symbol carries
    pub fn msg_len(&self) -> usize {
        self.msg_len
    }

    pub fn codeword_len(&self) -> usize {
        self.codeword_len
    }

    /// Truncates or zero pads `data` to the message length and appends parity.
    pub fn encode(&self, data: &[u8]) -> SymbolResult<Vec<u8>> {
        if data.iter().any(|&b| (b as u32) >> self.field_exp != 0) {
            return Err(SymbolError::SymbolOutOfField);
        }

        let mut msg = data.to_vec();
        if msg.len() > self.msg_len {
            warn!(len = msg.len(), capacity = self.msg_len, "Payload truncated to fit symbol");
        }
        msg.resize(self.msg_len, 0);

        match &self.rs {
            Some(rs) => rs.encode(&msg),
            None => Ok(msg),
        }
    }

    /// Corrects the codeword and strips parity and trailing zero padding. Returns the payload
    /// and the number of corrected positions. Symbols outside the field count as erasures.
    pub fn decode(&self, codeword: &[u8], erasures: &[usize]) -> SymbolResult<(Vec<u8>, usize)> {
        if codeword.len() < self.codeword_len {
            return Err(SymbolError::LayoutMismatch);
        }
        let mut cw = codeword[..self.codeword_len].to_vec();

        let mut erase_pos = erasures.iter().copied().filter(|&p| p < cw.len()).collect::<Vec<_>>();
        for (i, b) in cw.iter_mut().enumerate() {
            if (*b as u32) >> self.field_exp != 0 {
                *b = 0;
                erase_pos.push(i);
            }
        }
        erase_pos.sort_unstable();
        erase_pos.dedup();

        let (mut msg, corrected) = match &self.rs {
            Some(rs) => {
                let dec = rs.decode(&cw, &erase_pos)?;
                (dec.message, dec.errata.len())
            }
            None => {
                if !erase_pos.is_empty() {
                    warn!(count = erase_pos.len(), "Erasures ignored without error correction");
                }
                (cw, 0)
            }
        };

        let len = msg.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        msg.truncate(len);
        debug!(len, corrected, "Decoded payload");
        Ok((msg, corrected))
    }
}
