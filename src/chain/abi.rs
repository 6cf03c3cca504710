//! Solidity ABI encoding for the registry contract
//!
//! Covers only the types the contract surface uses: `address`, unsigned
//! integers up to 128 bits, `bool`, `bytes32`, `address[]`, the static
//! profile tuple and the `Error(string)` revert payload.
//!
//! Offsets and lengths in returned data come from the node and are
//! bounds-checked; arithmetic on them never wraps.

use sha3::{Digest, Keccak256};

use super::{Address, ChainError, OnchainRecord};

const WORD: usize = 32;

/// One encoded argument
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Address(Address),
    Uint(u128),
    Bool(bool),
    Bytes32([u8; 32]),
    String(String),
}

/// First four bytes of keccak256 of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector followed by the encoded arguments
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Head/tail encoding of a parameter list
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(addr) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr.as_bytes());
                head.extend_from_slice(&word);
            }
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Bool(value) => head.extend_from_slice(&uint_word(u128::from(*value))),
            Token::Bytes32(bytes) => head.extend_from_slice(bytes),
            Token::String(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(s.len() as u128));
                tail.extend_from_slice(s.as_bytes());
                let padding = (WORD - s.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(padding));
            }
        }
    }

    head.extend(tail);
    head
}

fn overflow(what: &str) -> ChainError {
    ChainError::Decode(format!("{} overflows the address space", what))
}

/// `base + index * WORD`, or a decode error if it does not fit
fn word_offset(base: usize, index: usize) -> Result<usize, ChainError> {
    index
        .checked_mul(WORD)
        .and_then(|rel| base.checked_add(rel))
        .ok_or_else(|| overflow("word offset"))
}

/// Cursor-free reader over returned data
struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], ChainError> {
        let end = start
            .checked_add(len)
            .ok_or_else(|| overflow("data range"))?;
        self.data.get(start..end).ok_or_else(|| {
            ChainError::Decode(format!("return data too short at offset {}", start))
        })
    }

    fn word(&self, offset: usize) -> Result<&'a [u8], ChainError> {
        self.slice(offset, WORD)
    }

    fn uint(&self, offset: usize) -> Result<u128, ChainError> {
        let word = self.word(offset)?;
        if word[..16].iter().any(|b| *b != 0) {
            return Err(ChainError::Decode(format!(
                "integer at offset {} exceeds 128 bits",
                offset
            )));
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(bytes))
    }

    fn usize(&self, offset: usize) -> Result<usize, ChainError> {
        usize::try_from(self.uint(offset)?)
            .map_err(|_| ChainError::Decode(format!("offset or length at {} out of range", offset)))
    }

    fn u8(&self, offset: usize) -> Result<u8, ChainError> {
        u8::try_from(self.uint(offset)?)
            .map_err(|_| ChainError::Decode(format!("value at offset {} is not a uint8", offset)))
    }

    fn bool(&self, offset: usize) -> Result<bool, ChainError> {
        match self.uint(offset)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ChainError::Decode(format!("invalid bool value {}", other))),
        }
    }

    fn address(&self, offset: usize) -> Result<Address, ChainError> {
        let word = self.word(offset)?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address(bytes))
    }

    fn bytes32(&self, offset: usize) -> Result<[u8; 32], ChainError> {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.word(offset)?);
        Ok(bytes)
    }

    /// String whose offset word sits at `pointer`, relative to `base`
    fn string(&self, base: usize, pointer: usize) -> Result<String, ChainError> {
        let start = base
            .checked_add(self.usize(pointer)?)
            .ok_or_else(|| overflow("string offset"))?;
        let len = self.usize(start)?;
        let bytes = self.slice(word_offset(start, 1)?, len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ChainError::Decode(format!("string is not UTF-8: {}", e)))
    }
}

pub fn decode_uint(data: &[u8]) -> Result<u128, ChainError> {
    Decoder::new(data).uint(0)
}

pub fn decode_address(data: &[u8]) -> Result<Address, ChainError> {
    Decoder::new(data).address(0)
}

pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, ChainError> {
    let decoder = Decoder::new(data);
    let start = decoder.usize(0)?;
    let len = decoder.usize(start)?;
    let items = word_offset(start, 1)?;
    // reject lengths the data cannot hold before allocating
    decoder.slice(items, len.checked_mul(WORD).ok_or_else(|| overflow("array length"))?)?;
    (0..len)
        .map(|i| decoder.address(word_offset(items, i)?))
        .collect()
}

/// Reason string of a `revert("...")`, if the data carries `Error(string)`
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let payload = data.strip_prefix(&selector("Error(string)")[..])?;
    Decoder::new(payload).string(0, 0).ok()
}

/// Decode the `UserProfile` struct returned by `getUserProfile`
///
/// Layout: `(bytes32 ipfsHash, uint8 location, uint8 primarySkill,
/// uint8 secondarySkill, uint8 status, uint8 language,
/// uint8 yearsOfExperience, bool exists)`. Every member is static, so the
/// tuple is encoded inline as eight words.
pub fn decode_profile(data: &[u8]) -> Result<OnchainRecord, ChainError> {
    let decoder = Decoder::new(data);

    Ok(OnchainRecord {
        ipfs_hash: decoder.bytes32(0)?,
        location: decoder.u8(WORD)?,
        primary_skill: decoder.u8(2 * WORD)?,
        secondary_skill: decoder.u8(3 * WORD)?,
        status: decoder.u8(4 * WORD)?,
        language: decoder.u8(5 * WORD)?,
        years_of_experience: decoder.u8(6 * WORD)?,
        exists: decoder.bool(7 * WORD)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("owner()")), "8da5cb5b");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_encode_static_arguments() {
        let addr: Address = "0xDEAD".parse().unwrap();
        let data = encode(&[Token::Address(addr), Token::Uint(10), Token::Bytes32([7; 32])]);
        assert_eq!(data.len(), 3 * WORD);
        assert_eq!(&data[30..32], &[0xde, 0xad]);
        assert_eq!(data[63], 10);
        assert!(data[64..].iter().all(|b| *b == 7));
    }

    #[test]
    fn test_encode_string_goes_to_tail() {
        let data = encode(&[Token::String("hello".to_string()), Token::Uint(3)]);
        // head: offset + uint, tail: length + one padded word
        assert_eq!(data.len(), 4 * WORD);
        assert_eq!(data[31], 0x40);
        assert_eq!(data[63], 3);
        assert_eq!(data[95], 5);
        assert_eq!(&data[96..101], b"hello");
        assert!(data[101..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decode_address_array() {
        let a: Address = "0x01".parse().unwrap();
        let b: Address = "0x02".parse().unwrap();

        let mut data = uint_word(0x20).to_vec();
        data.extend(uint_word(2));
        data.extend(encode(&[Token::Address(a), Token::Address(b)]));

        assert_eq!(decode_address_array(&data).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_decode_empty_address_array() {
        let mut data = uint_word(0x20).to_vec();
        data.extend(uint_word(0));
        assert!(decode_address_array(&data).unwrap().is_empty());
    }

    fn profile_words(ipfs_hash: [u8; 32], fields: [u128; 7]) -> Vec<u8> {
        let mut data = ipfs_hash.to_vec();
        for field in fields {
            data.extend(uint_word(field));
        }
        data
    }

    #[test]
    fn test_decode_profile_tuple() {
        let data = profile_words([0xab; 32], [1, 2, 3, 0, 4, 7, 1]);
        assert_eq!(data.len(), 8 * WORD);

        let record = decode_profile(&data).unwrap();
        assert_eq!(record.ipfs_hash, [0xab; 32]);
        assert_eq!(record.location, 1);
        assert_eq!(record.primary_skill, 2);
        assert_eq!(record.secondary_skill, 3);
        assert_eq!(record.status, 0);
        assert_eq!(record.language, 4);
        assert_eq!(record.years_of_experience, 7);
        assert!(record.exists);
    }

    #[test]
    fn test_decode_missing_profile() {
        let record = decode_profile(&[0u8; 8 * WORD]).unwrap();
        assert!(!record.exists);
        assert_eq!(record.ipfs_hash, [0u8; 32]);
    }

    #[test]
    fn test_decode_revert_reason() {
        let mut data = selector("Error(string)").to_vec();
        data.extend(encode(&[Token::String("User already registered".to_string())]));
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("User already registered")
        );
        assert_eq!(decode_revert_reason(&[0u8; 4]), None);
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(decode_uint(&[0u8; 10]).is_err());
        assert!(decode_profile(&[0u8; 7 * WORD]).is_err());
    }

    #[test]
    fn test_decode_rejects_wide_uint8() {
        let data = profile_words([0; 32], [300, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(decode_profile(&data), Err(ChainError::Decode(_))));
    }

    #[test]
    fn test_huge_offsets_are_decode_errors() {
        let huge = uint_word(u64::MAX as u128);

        assert!(matches!(decode_profile(&huge), Err(ChainError::Decode(_))));
        assert!(matches!(
            decode_address_array(&huge),
            Err(ChainError::Decode(_))
        ));

        let mut array = uint_word(0x20).to_vec();
        array.extend(uint_word(u64::MAX as u128));
        assert!(matches!(
            decode_address_array(&array),
            Err(ChainError::Decode(_))
        ));

        let mut revert = selector("Error(string)").to_vec();
        revert.extend(huge);
        assert_eq!(decode_revert_reason(&revert), None);

        let mut long_string = selector("Error(string)").to_vec();
        long_string.extend(uint_word(0x20));
        long_string.extend(uint_word(u64::MAX as u128));
        assert_eq!(decode_revert_reason(&long_string), None);
    }

    #[test]
    fn test_word_offset_checks_overflow() {
        assert_eq!(word_offset(32, 2).unwrap(), 96);
        assert!(word_offset(usize::MAX, 1).is_err());
        assert!(word_offset(0, usize::MAX).is_err());
    }
}
