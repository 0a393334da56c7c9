//! Weak XOR stream cipher used for encrypted blocks.
//!
//! Every little endian 16 bit word is XORed with the next value of an [`Lcg`]
//! keystream. The keystream only covers 15 bits, so the top bit of each word is
//! never touched. A trailing odd byte is passed through unchanged.
//!
//! Encryption and decryption are the same operation.

use byteorder::{ByteOrder, LittleEndian};
use tracing::instrument;

use crate::lcg::Lcg;

/// Keystream seed used throughout the format
pub const SEED: i32 = 0xA2C2A;

/// Applies the keystream for `seed` to `data` in place.
pub fn apply_keystream(data: &mut [u8], seed: i32) {
    let mut keystream = Lcg::new(seed);
    for word in data.chunks_exact_mut(2) {
        let value = LittleEndian::read_u16(word) ^ keystream.advance();
        LittleEndian::write_u16(word, value);
    }
}

/// Returns a decrypted copy of `data`
#[instrument(skip_all, fields(len = data.len()))]
pub fn decrypt(data: &[u8], seed: i32) -> Vec<u8> {
    let mut out = data.to_vec();
    apply_keystream(&mut out, seed);
    out
}

/// Returns an encrypted copy of `data`
#[instrument(skip_all, fields(len = data.len()))]
pub fn encrypt(data: &[u8], seed: i32) -> Vec<u8> {
    decrypt(data, seed)
}
