use core::{fmt, str::FromStr, time::Duration};

use crate::id::{ParseIdError, layout};

/// Width of the timestamp field in bits.
pub const TIMESTAMP_BITS: u32 = 41;

/// Width of the worker ID field in bits.
pub const WORKER_ID_BITS: u32 = 10;

/// Width of the sequence field in bits.
pub const SEQUENCE_BITS: u32 = 12;

/// Largest timestamp offset the 41-bit field can hold.
pub const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Largest worker ID the 10-bit field can hold (1023).
pub const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1;

/// Largest sequence the 12-bit field can hold (4095).
pub const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// A 64-bit Snowflake ID using the Twitter layout
///
/// - 1 bit reserved, always zero
/// - 41 bits timestamp (ms since [`TWITTER_EPOCH`])
/// - 10 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21            12 11             0
///              +--------------+----------------+----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | worker ID (10) | sequence (12) |
///              +--------------+----------------+----------------+---------------+
///              |<----------- MSB ---------- 64 bits ---------- LSB ------------>|
/// ```
///
/// IDs order by timestamp first, then worker ID, then sequence, which is the
/// same as ordering their raw integers.
///
/// # Example
///
/// ```
/// use snowgen::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.worker_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_raw(), (1000 << 22) | (2 << 12) | 1);
/// ```
///
/// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for the 41-bit timestamp field once shifted down.
    pub const TIMESTAMP_MASK: u64 = MAX_TIMESTAMP;

    /// Bitmask for the 10-bit worker ID field once shifted down.
    pub const WORKER_ID_MASK: u64 = MAX_WORKER_ID;

    /// Bitmask for the 12-bit sequence field.
    pub const SEQUENCE_MASK: u64 = MAX_SEQUENCE;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = WORKER_ID_BITS + SEQUENCE_BITS;

    /// Number of bits to shift the worker ID to its position (bit 12).
    pub const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;

    /// Keeps the packed value inside the positive range of an `i64`.
    pub const ID_MASK: u64 = (1 << 63) - 1;

    /// Packs the three fields into an ID.
    ///
    /// No range checks are performed: callers pass a worker ID and sequence
    /// that already fit their fields. Timestamp bits beyond the 41-bit field
    /// are discarded with the reserved bit.
    pub const fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        let id = (timestamp << Self::TIMESTAMP_SHIFT)
            | (worker_id << Self::WORKER_ID_SHIFT)
            | sequence;
        Self {
            id: id & Self::ID_MASK,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        self.id & Self::SEQUENCE_MASK
    }

    /// Returns the raw 64-bit integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw integer without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Milliseconds since the UNIX epoch at which this ID was issued, given
    /// the epoch its timestamp is relative to.
    ///
    /// ```
    /// use snowgen::{SnowflakeId, TWITTER_EPOCH};
    ///
    /// let id = SnowflakeId::from_components(0, 0, 0);
    /// assert_eq!(id.to_unix_millis(TWITTER_EPOCH), 1_288_834_974_657);
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    pub const fn to_unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp().saturating_add(epoch.as_millis() as u64)
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts
    /// lexicographically in the same order as the IDs themselves.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse()?;
        if raw & !Self::ID_MASK != 0 {
            return Err(ParseIdError::ReservedBitSet(raw));
        }
        Ok(Self::from_raw(raw))
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        layout::write_bit_layout_debug(f, self)
    }
}
