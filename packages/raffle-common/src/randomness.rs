use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};

/// Expand 32 bytes of beacon randomness into `num_words` independent words.
///
/// `word_i = uint256_be( sha256( randomness || request_id_u64_be || i_u32_be ) )`
///
/// Binding the request id into every word means two requests served by the
/// same beacon still receive different words.
pub fn expand_random_words(randomness: &[u8; 32], request_id: u64, num_words: u32) -> Vec<Uint256> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(randomness);
            hasher.update(request_id.to_be_bytes());
            hasher.update(i.to_be_bytes());
            let digest: [u8; 32] = hasher.finalize().into();
            Uint256::from_be_bytes(digest)
        })
        .collect()
}

/// Reduce a random word to an index in `[0, len)`.
///
/// Returns `None` when `len` is zero.
pub fn pick_index(word: Uint256, len: u32) -> Option<u32> {
    if len == 0 {
        return None;
    }
    let rem = word % Uint256::from(u64::from(len));
    // rem < len <= u32::MAX, so only the low four bytes are set
    let bytes = rem.to_be_bytes();
    let mut low = [0u8; 4];
    low.copy_from_slice(&bytes[28..32]);
    Some(u32::from_be_bytes(low))
}
