use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zerocopy::FromBytes;

use crate::DelegationCommonError;

/// The size of an [`Identity`] in bytes.
pub const IDENTITY_SIZE: usize = 20;

/// The size of an [`ItemId`] in bytes.
pub const ITEM_ID_SIZE: usize = 32;

/// An opaque, fixed-width public address.
///
/// Vaults, delegates and collections are all identified this way. The bytes
/// are never interpreted; the zero identity is an ordinary address like any
/// other. Identities render as `0x` prefixed lowercase hex.
///
/// ```rust
/// use delegation_common::Identity;
///
/// let vault: Identity = "0x00000000000000000000000000000000000000ff".parse().unwrap();
///
/// let mut bytes = [0u8; 20];
/// bytes[19] = 0xff;
/// assert_eq!(vault, Identity::new(bytes));
/// assert_eq!(vault.to_string(), "0x00000000000000000000000000000000000000ff");
/// ```
#[derive(
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::Immutable,
    zerocopy_derive::KnownLayout,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[repr(transparent)]
pub struct Identity(#[serde(with = "serde_bytes")] [u8; IDENTITY_SIZE]);

impl Identity {
    /// The all-zero identity.
    pub const ZERO: Identity = Identity([0u8; IDENTITY_SIZE]);

    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; IDENTITY_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_SIZE] {
        &self.0
    }
}

impl From<[u8; IDENTITY_SIZE]> for Identity {
    fn from(value: [u8; IDENTITY_SIZE]) -> Self {
        Self(value)
    }
}

impl From<Identity> for [u8; IDENTITY_SIZE] {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl TryFrom<&[u8]> for Identity {
    type Error = DelegationCommonError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Identity::read_from_bytes(value).map_err(|_| {
            DelegationCommonError::InvalidIdentity(format!(
                "expected {IDENTITY_SIZE} bytes, got {}",
                value.len()
            ))
        })
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes().as_slice()
    }
}

impl FromStr for Identity {
    type Err = DelegationCommonError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; IDENTITY_SIZE];
        hex::decode_to_slice(strip_hex_prefix(value), &mut bytes)
            .map_err(|error| DelegationCommonError::InvalidIdentity(format!("{value}: {error}")))?;
        Ok(Self(bytes))
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Identity").field(&self.to_string()).finish()
    }
}

/// Identifier of one item within a collection.
///
/// Item ids are opaque 256-bit values stored big-endian, so numeric
/// conversions order the same way the bytes do.
#[derive(
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::Immutable,
    zerocopy_derive::KnownLayout,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[repr(transparent)]
pub struct ItemId(#[serde(with = "serde_bytes")] [u8; ITEM_ID_SIZE]);

impl ItemId {
    /// Wrap raw big-endian item bytes.
    pub const fn new(bytes: [u8; ITEM_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw big-endian item bytes.
    pub fn as_bytes(&self) -> &[u8; ITEM_ID_SIZE] {
        &self.0
    }
}

impl From<[u8; ITEM_ID_SIZE]> for ItemId {
    fn from(value: [u8; ITEM_ID_SIZE]) -> Self {
        Self(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        ItemId::from(u128::from(value))
    }
}

impl From<u128> for ItemId {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; ITEM_ID_SIZE];
        bytes[ITEM_ID_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ItemId {
    type Error = DelegationCommonError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        ItemId::read_from_bytes(value).map_err(|_| {
            DelegationCommonError::InvalidItemId(format!(
                "expected {ITEM_ID_SIZE} bytes, got {}",
                value.len()
            ))
        })
    }
}

impl AsRef<[u8]> for ItemId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl FromStr for ItemId {
    type Err = DelegationCommonError;

    /// Accepts either a decimal number of up to 256 bits or a `0x` prefixed
    /// hex string of exactly 32 bytes.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.starts_with("0x") || value.starts_with("0X") {
            let mut bytes = [0u8; ITEM_ID_SIZE];
            hex::decode_to_slice(strip_hex_prefix(value), &mut bytes).map_err(|error| {
                DelegationCommonError::InvalidItemId(format!("{value}: {error}"))
            })?;
            return Ok(Self(bytes));
        }

        parse_decimal(value).map(Self).ok_or_else(|| {
            DelegationCommonError::InvalidItemId(format!(
                "{value}: expected a 256-bit decimal number or 0x prefixed hex"
            ))
        })
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ItemId").field(&self.to_string()).finish()
    }
}

/// Big-endian bytes of a decimal number, or `None` if it is empty, holds a
/// non-digit or does not fit in 256 bits.
fn parse_decimal(digits: &str) -> Option<[u8; ITEM_ID_SIZE]> {
    if digits.is_empty() {
        return None;
    }

    let mut bytes = [0u8; ITEM_ID_SIZE];
    for digit in digits.chars() {
        let mut carry = digit.to_digit(10)?;
        for byte in bytes.iter_mut().rev() {
            let value = u32::from(*byte) * 10 + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }
        if carry != 0 {
            return None;
        }
    }

    Some(bytes)
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn it_parses_and_displays_identities() -> TestResult {
        let text = "0x00112233445566778899aabbccddeeff00112233";
        let identity: Identity = text.parse()?;

        assert_eq!(identity.to_string(), text);
        assert_eq!(identity.as_bytes()[1], 0x11);
        assert_eq!(
            "00112233445566778899AABBCCDDEEFF00112233".parse::<Identity>()?,
            identity
        );

        Ok(())
    }

    #[test]
    fn it_rejects_malformed_identities() {
        assert!(matches!(
            "0x1234".parse::<Identity>(),
            Err(DelegationCommonError::InvalidIdentity(_))
        ));
        assert!(matches!(
            "0xzz112233445566778899aabbccddeeff00112233".parse::<Identity>(),
            Err(DelegationCommonError::InvalidIdentity(_))
        ));
        assert!(Identity::try_from([1u8; 19].as_slice()).is_err());
    }

    #[test]
    fn it_treats_the_zero_identity_as_an_ordinary_value() -> TestResult {
        let zero = Identity::try_from([0u8; IDENTITY_SIZE].as_slice())?;

        assert_eq!(zero, Identity::ZERO);
        assert_eq!(zero, Identity::default());
        assert_ne!(zero, Identity::from([1u8; IDENTITY_SIZE]));

        Ok(())
    }

    #[test]
    fn it_converts_numbers_to_big_endian_item_ids() -> TestResult {
        let item = ItemId::from(42u64);

        assert_eq!(item.as_bytes()[ITEM_ID_SIZE - 1], 42);
        assert!(item.as_bytes()[..ITEM_ID_SIZE - 1].iter().all(|byte| *byte == 0));
        assert_eq!("42".parse::<ItemId>()?, item);
        assert_eq!(item.to_string().parse::<ItemId>()?, item);
        assert!(ItemId::from(7u64) < ItemId::from(300u64));

        Ok(())
    }

    #[test]
    fn it_parses_decimal_item_ids_beyond_128_bits() -> TestResult {
        let above_u128: ItemId = "340282366920938463463374607431768211456".parse()?;
        let mut expected = [0u8; ITEM_ID_SIZE];
        expected[ITEM_ID_SIZE - 17] = 1;
        assert_eq!(above_u128, ItemId::new(expected));
        assert!(above_u128 > ItemId::from(u128::MAX));

        let max: ItemId =
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                .parse()?;
        assert_eq!(max, ItemId::new([0xff; ITEM_ID_SIZE]));

        assert!(matches!(
            "115792089237316195423570985008687907853269984665640564039457584007913129639936"
                .parse::<ItemId>(),
            Err(DelegationCommonError::InvalidItemId(_))
        ));

        Ok(())
    }

    #[test]
    fn it_rejects_malformed_item_ids() {
        assert!(matches!(
            "forty-two".parse::<ItemId>(),
            Err(DelegationCommonError::InvalidItemId(_))
        ));
        assert!(matches!(
            "0x2a".parse::<ItemId>(),
            Err(DelegationCommonError::InvalidItemId(_))
        ));
        assert!("".parse::<ItemId>().is_err());
        assert!("-1".parse::<ItemId>().is_err());
    }

    #[test]
    fn it_serializes_identities_as_byte_strings() -> TestResult {
        let identity = Identity::from([7u8; IDENTITY_SIZE]);
        let encoded = serde_ipld_dagcbor::to_vec(&identity)?;

        // CBOR major type 2 (byte string) with a one byte length of 20
        assert_eq!(encoded[0], 0x54);
        assert_eq!(serde_ipld_dagcbor::from_slice::<Identity>(&encoded)?, identity);

        Ok(())
    }
}
