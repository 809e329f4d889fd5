//! Program ids, shared PDAs and little-endian field readers.

use crate::error::ProtocolError;
use solana_sdk::pubkey::Pubkey;

/// Orca Whirlpool program.
pub const WHIRLPOOL_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc");

/// Meteora DLMM program.
pub const DLMM_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

/// SPL Token-2022 program.
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// System program.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");

/// Size of an SPL mint account.
pub const MINT_ACCOUNT_LEN: usize = 82;

const MINT_DECIMALS_OFFSET: usize = 44;

/// Derives the associated token account of `owner` for `mint`.
#[must_use]
pub fn derive_ata(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Derives the Anchor event authority of `program_id`.
#[must_use]
pub fn derive_event_authority(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"__event_authority"], program_id).0
}

/// Reads the decimals of an SPL or Token-2022 mint.
///
/// # Errors
/// Returns `Parse` if the data is shorter than a mint account.
pub fn mint_decimals(address: &Pubkey, data: &[u8]) -> Result<u8, ProtocolError> {
    if data.len() < MINT_ACCOUNT_LEN {
        return Err(ProtocolError::parse(
            "Mint",
            *address,
            format!("{} bytes, need >= {MINT_ACCOUNT_LEN}", data.len()),
        ));
    }
    Ok(data[MINT_DECIMALS_OFFSET])
}

/// Bounds-checked reader over raw account data.
pub(crate) struct Reader<'a> {
    kind: &'static str,
    address: Pubkey,
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(
        kind: &'static str,
        address: Pubkey,
        data: &'a [u8],
        min_len: usize,
    ) -> Result<Self, ProtocolError> {
        if data.len() < min_len {
            return Err(ProtocolError::parse(
                kind,
                address,
                format!("{} bytes, need >= {min_len}", data.len()),
            ));
        }
        Ok(Self {
            kind,
            address,
            data,
        })
    }

    pub(crate) fn discriminator(&self, expected: [u8; 8]) -> Result<(), ProtocolError> {
        if self.data[..8] != expected {
            return Err(ProtocolError::parse(
                self.kind,
                self.address,
                "unexpected account discriminator",
            ));
        }
        Ok(())
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N], ProtocolError> {
        self.data
            .get(offset..offset + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| {
                ProtocolError::parse(self.kind, self.address, format!("field at {offset} out of bounds"))
            })
    }

    pub(crate) fn pubkey(&self, offset: usize) -> Result<Pubkey, ProtocolError> {
        Ok(Pubkey::new_from_array(self.bytes::<32>(offset)?))
    }

    pub(crate) fn u16(&self, offset: usize) -> Result<u16, ProtocolError> {
        Ok(u16::from_le_bytes(self.bytes(offset)?))
    }

    pub(crate) fn i32(&self, offset: usize) -> Result<i32, ProtocolError> {
        Ok(i32::from_le_bytes(self.bytes(offset)?))
    }

    pub(crate) fn u64(&self, offset: usize) -> Result<u64, ProtocolError> {
        Ok(u64::from_le_bytes(self.bytes(offset)?))
    }

    pub(crate) fn u128(&self, offset: usize) -> Result<u128, ProtocolError> {
        Ok(u128::from_le_bytes(self.bytes(offset)?))
    }
}

/// Starts instruction data with an Anchor discriminator.
pub(crate) fn with_discriminator(discriminator: [u8; 8], capacity: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + capacity);
    data.extend_from_slice(&discriminator);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_are_distinct() {
        let ids = [
            WHIRLPOOL_PROGRAM_ID,
            DLMM_PROGRAM_ID,
            TOKEN_PROGRAM_ID,
            TOKEN_2022_PROGRAM_ID,
            ASSOCIATED_TOKEN_PROGRAM_ID,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn test_derive_ata_deterministic() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let a = derive_ata(&owner, &mint, &TOKEN_PROGRAM_ID);
        assert_eq!(a, derive_ata(&owner, &mint, &TOKEN_PROGRAM_ID));
        assert_ne!(a, derive_ata(&owner, &mint, &TOKEN_2022_PROGRAM_ID));
    }

    #[test]
    fn test_mint_decimals() {
        let mut data = vec![0u8; MINT_ACCOUNT_LEN];
        data[44] = 9;
        assert_eq!(mint_decimals(&Pubkey::default(), &data).unwrap(), 9);
        assert!(mint_decimals(&Pubkey::default(), &data[..40]).is_err());
    }

    #[test]
    fn test_reader_bounds() {
        let data = [1u8; 16];
        let reader = Reader::new("Test", Pubkey::default(), &data, 16).unwrap();
        assert_eq!(reader.u16(0).unwrap(), 0x0101);
        assert!(reader.u64(12).is_err());
        assert!(Reader::new("Test", Pubkey::default(), &data, 32).is_err());
    }
}
