use core::num::ParseIntError;

/// Errors from parsing a [`SnowflakeId`] out of its decimal form.
///
/// [`SnowflakeId`]: crate::SnowflakeId
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input is not an unsigned 64-bit decimal integer.
    #[error("invalid snowflake id: {0}")]
    InvalidDigits(#[from] ParseIntError),

    /// The value sets the reserved most significant bit.
    #[error("snowflake id {0} sets the reserved sign bit")]
    ReservedBitSet(u64),
}
