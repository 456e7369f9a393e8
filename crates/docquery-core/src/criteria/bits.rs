//! Bitwise query operators (`$bitsAllClear`, `$bitsAllSet`, `$bitsAnyClear`, `$bitsAnySet`).

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use bytes::Bytes;
use docquery_model::Value;

use super::Criteria;
use super::node::Operator;
use crate::error::{CriteriaError, CriteriaResult};

// Padding bits after the last full byte are ignored, matching how drivers
// decode bitmask strings.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A bitmask argument: a number, a base64-encoded binary mask, or explicit
/// bit positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bitmask {
    /// Numeric mask.
    Numeric(i64),
    /// Base64-encoded binary mask; bit 0 is the lowest bit of the first byte.
    Encoded(String),
    /// Bit positions; `None` entries are rejected.
    Positions(Vec<Option<u32>>),
}

impl Bitmask {
    fn into_value(self) -> CriteriaResult<Value> {
        match self {
            Self::Numeric(mask) => Ok(Value::Int64(mask)),
            Self::Encoded(encoded) => {
                let trimmed = encoded.trim();
                if trimmed.is_empty() {
                    return Err(CriteriaError::InvalidBitmask {
                        message: "bitmask string must not be blank".to_owned(),
                    });
                }
                let decoded =
                    LENIENT_BASE64
                        .decode(trimmed)
                        .map_err(|e| CriteriaError::InvalidBitmask {
                            message: format!("bitmask '{trimmed}' is not valid base64: {e}"),
                        })?;
                Ok(Value::Binary(Bytes::from(decoded)))
            }
            Self::Positions(positions) => {
                let mut values = Vec::with_capacity(positions.len());
                for (index, position) in positions.into_iter().enumerate() {
                    let position = position.ok_or_else(|| CriteriaError::InvalidBitmask {
                        message: format!("bit position at index {index} is missing"),
                    })?;
                    let position =
                        i32::try_from(position).map_err(|_| CriteriaError::InvalidBitmask {
                            message: format!("bit position {position} is out of range"),
                        })?;
                    values.push(Value::Int32(position));
                }
                Ok(Value::Array(values))
            }
        }
    }
}

impl From<i64> for Bitmask {
    fn from(mask: i64) -> Self {
        Self::Numeric(mask)
    }
}

impl From<i32> for Bitmask {
    fn from(mask: i32) -> Self {
        Self::Numeric(i64::from(mask))
    }
}

impl From<&str> for Bitmask {
    fn from(encoded: &str) -> Self {
        Self::Encoded(encoded.to_owned())
    }
}

impl From<String> for Bitmask {
    fn from(encoded: String) -> Self {
        Self::Encoded(encoded)
    }
}

impl From<Vec<u32>> for Bitmask {
    fn from(positions: Vec<u32>) -> Self {
        Self::Positions(positions.into_iter().map(Some).collect())
    }
}

impl From<&[u32]> for Bitmask {
    fn from(positions: &[u32]) -> Self {
        Self::Positions(positions.iter().copied().map(Some).collect())
    }
}

impl From<Vec<Option<u32>>> for Bitmask {
    fn from(positions: Vec<Option<u32>>) -> Self {
        Self::Positions(positions)
    }
}

/// Narrow builder writing bitwise operators into the active node of a
/// [`Criteria`]. Obtained from [`Criteria::bits`].
#[derive(Debug)]
pub struct BitwiseOperators<'a> {
    target: &'a mut Criteria,
}

impl<'a> BitwiseOperators<'a> {
    pub(crate) fn new(target: &'a mut Criteria) -> Self {
        Self { target }
    }

    /// `$bitsAllClear`: every bit in the mask is 0.
    pub fn all_clear(self, mask: impl Into<Bitmask>) -> CriteriaResult<&'a mut Criteria> {
        self.put(Operator::BitsAllClear, mask.into())
    }

    /// `$bitsAllSet`: every bit in the mask is 1.
    pub fn all_set(self, mask: impl Into<Bitmask>) -> CriteriaResult<&'a mut Criteria> {
        self.put(Operator::BitsAllSet, mask.into())
    }

    /// `$bitsAnyClear`: at least one bit in the mask is 0.
    pub fn any_clear(self, mask: impl Into<Bitmask>) -> CriteriaResult<&'a mut Criteria> {
        self.put(Operator::BitsAnyClear, mask.into())
    }

    /// `$bitsAnySet`: at least one bit in the mask is 1.
    pub fn any_set(self, mask: impl Into<Bitmask>) -> CriteriaResult<&'a mut Criteria> {
        self.put(Operator::BitsAnySet, mask.into())
    }

    fn put(self, operator: Operator, mask: Bitmask) -> CriteriaResult<&'a mut Criteria> {
        let value = mask.into_value()?;
        self.target.active_mut().put(operator, value);
        Ok(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_positions(bytes: &[u8]) -> Vec<u32> {
        let mut positions = Vec::new();
        for (byte_index, byte) in bytes.iter().enumerate() {
            for bit in 0..8u32 {
                if byte & (1 << bit) != 0 {
                    positions.push(u32::try_from(byte_index).unwrap() * 8 + bit);
                }
            }
        }
        positions
    }

    #[test]
    fn test_should_store_numeric_mask() {
        let mut criteria = Criteria::field("flags");
        criteria.bits().all_clear(35).unwrap();
        assert_eq!(
            criteria.compile().unwrap().to_string(),
            r#"{"flags":{"$bitsAllClear":35}}"#
        );
    }

    #[test]
    fn test_should_decode_string_mask_to_binary() {
        let mut criteria = Criteria::field("flags");
        criteria.bits().all_set("Dw==").unwrap();
        let compiled = criteria.compile().unwrap();
        let stored = compiled.get("flags").unwrap().as_document().unwrap();
        let binary = stored.get("$bitsAllSet").unwrap().as_binary().unwrap();
        assert_eq!(binary, &[0x0f]);
        assert_eq!(set_positions(binary), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_should_match_positions_for_equivalent_mask() {
        let mut encoded = Criteria::field("f");
        encoded.bits().any_set("AQI=").unwrap();
        let compiled = encoded.compile().unwrap();
        let binary = compiled
            .get("f")
            .and_then(Value::as_document)
            .and_then(|d| d.get("$bitsAnySet"))
            .and_then(Value::as_binary)
            .unwrap()
            .to_vec();

        let mut positional = Criteria::field("f");
        positional.bits().any_set(set_positions(&binary)).unwrap();
        assert_eq!(
            positional.compile().unwrap().to_string(),
            r#"{"f":{"$bitsAnySet":[0,9]}}"#
        );
    }

    #[test]
    fn test_should_accept_trailing_bits_in_string_mask() {
        let mut criteria = Criteria::field("f");
        criteria.bits().all_clear("AB==").unwrap();
        let compiled = criteria.compile().unwrap();
        let stored = compiled.get("f").and_then(Value::as_document).unwrap();
        assert_eq!(stored.get("$bitsAllClear").unwrap().as_binary(), Some(&[0u8][..]));
    }

    #[test]
    fn test_should_reject_blank_string_mask() {
        let mut criteria = Criteria::field("f");
        let err = criteria.bits().any_clear("  ").unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidBitmask { .. }));
        assert_eq!(criteria.compile().unwrap().to_string(), r#"{"f":{}}"#);
    }

    #[test]
    fn test_should_reject_invalid_base64() {
        let mut criteria = Criteria::field("f");
        let err = criteria.bits().any_clear("not base64!").unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidBitmask { .. }));
    }

    #[test]
    fn test_should_reject_missing_position() {
        let mut criteria = Criteria::field("f");
        let err = criteria
            .bits()
            .all_set(vec![Some(1), None, Some(3)])
            .unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidBitmask { .. }));
    }

    #[test]
    fn test_should_continue_chain_after_bits() {
        let mut criteria = Criteria::field("f");
        criteria.bits().all_set(vec![1u32, 5]).unwrap().exists(true);
        assert_eq!(
            criteria.compile().unwrap().to_string(),
            r#"{"f":{"$bitsAllSet":[1,5],"$exists":true}}"#
        );
    }
}
