use core::fmt::{self, Debug, Display, Formatter};

use log::warn;

use num_enum::TryFromPrimitive;

use crate::hex::{self, HexError};

/// Maximum length, in bytes, of an operational dataset in its binary TLV form.
///
/// Matches OpenThread's `OT_OPERATIONAL_DATASET_MAX_LENGTH`.
pub const MAX_DATASET_TLVS_LEN: usize = 254;

/// Errors reported when building an operational dataset from its hex form.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DatasetError {
    /// The hex string has more characters than would fit in
    /// [`MAX_DATASET_TLVS_LEN`] bytes once decoded
    TooLong(usize),
    /// The hex string is malformed, or decodes to an empty dataset
    DecodeFailed,
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(chars) => write!(
                f,
                "Dataset hex string of {chars} characters exceeds the maximum dataset size"
            ),
            Self::DecodeFailed => write!(
                f,
                "Dataset hex string did not decode to a non-empty TLV sequence"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DatasetError {}

/// The TLV type codes an operational dataset is composed of.
///
/// These are the MeshCoP TLV assignments from the Thread specification;
/// only the types that can occur in an operational dataset are listed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum MeshcopTlvType {
    Channel = 0,
    PanId = 1,
    ExtendedPanId = 2,
    NetworkName = 3,
    Pskc = 4,
    NetworkKey = 5,
    NetworkKeySequence = 6,
    MeshLocalPrefix = 7,
    SteeringData = 8,
    BorderAgentLocator = 9,
    CommissionerId = 10,
    CommissionerSessionId = 11,
    SecurityPolicy = 12,
    ActiveTimestamp = 14,
    CommissionerUdpPort = 15,
    PendingTimestamp = 51,
    DelayTimer = 52,
    ChannelMask = 53,
}

/// A single TLV record borrowed from an operational dataset.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Tlv<'a> {
    /// Raw TLV type code
    pub tlv_type: u8,
    /// The record payload
    pub value: &'a [u8],
}

impl Tlv<'_> {
    /// Return the TLV type as a [`MeshcopTlvType`], if it is a known one.
    pub fn meshcop_type(&self) -> Option<MeshcopTlvType> {
        MeshcopTlvType::try_from(self.tlv_type).ok()
    }
}

/// Iterator over the TLV records of an operational dataset.
///
/// Iteration ends at the first record whose declared length runs past
/// the end of the buffer.
pub struct TlvIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Tlv<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&tlv_type, rest) = self.rest.split_first()?;
        let (&len, rest) = rest.split_first()?;

        if rest.len() < len as usize {
            self.rest = &[];
            return None;
        }

        let (value, rest) = rest.split_at(len as usize);
        self.rest = rest;

        Some(Tlv { tlv_type, value })
    }
}

/// An operational dataset in its binary TLV form, as consumed by the
/// Thread stack's active-dataset API.
///
/// Built from the hex representation with [`OperationalDatasetTlvs::from_hex`];
/// a successfully built value always holds between 1 and
/// [`MAX_DATASET_TLVS_LEN`] bytes.
#[derive(Clone)]
pub struct OperationalDatasetTlvs {
    tlvs: [u8; MAX_DATASET_TLVS_LEN],
    len: u8,
}

impl OperationalDatasetTlvs {
    /// Decode the hex string `dataset` into its binary TLV form.
    ///
    /// The string is rejected up-front if it cannot fit in
    /// [`MAX_DATASET_TLVS_LEN`] bytes, and after decoding if it is malformed
    /// hex. The hex decoder accepts an empty string, but an empty dataset is
    /// rejected here with [`DatasetError::DecodeFailed`].
    pub fn from_hex(dataset: &str) -> Result<Self, DatasetError> {
        if dataset.len() > MAX_DATASET_TLVS_LEN * 2 {
            return Err(DatasetError::TooLong(dataset.len()));
        }

        let mut tlvs = [0; MAX_DATASET_TLVS_LEN];

        let len = match hex::decode_into(dataset, &mut tlvs) {
            Ok(len) => len,
            Err(err) => {
                warn!("Failed to convert the configured dataset: {err}");
                return Err(DatasetError::DecodeFailed);
            }
        };

        if len == 0 {
            return Err(DatasetError::DecodeFailed);
        }

        Ok(Self {
            tlvs,
            len: len as _,
        })
    }

    /// Return the dataset TLV bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.tlvs[..self.len as usize]
    }

    /// Return the length of the dataset, in bytes.
    pub fn len(&self) -> usize {
        self.len as _
    }

    /// Return `true` if the dataset holds no TLV bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the TLV records of the dataset.
    pub fn tlvs(&self) -> TlvIter<'_> {
        TlvIter {
            rest: self.as_slice(),
        }
    }

    /// Return the network name announced by the dataset, if present and valid.
    pub fn network_name(&self) -> Option<heapless::String<16>> {
        let value = self.find(MeshcopTlvType::NetworkName)?;

        core::str::from_utf8(value).ok()?.try_into().ok()
    }

    /// Return the PAN ID announced by the dataset, if present.
    pub fn pan_id(&self) -> Option<u16> {
        let value = self.find(MeshcopTlvType::PanId)?;

        Some(u16::from_be_bytes(value.try_into().ok()?))
    }

    /// Return the radio channel announced by the dataset, if present.
    pub fn channel(&self) -> Option<u16> {
        // Channel TLV payload is a channel page byte followed by the channel
        let value = self.find(MeshcopTlvType::Channel)?;

        match value {
            [_, hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    fn find(&self, tlv_type: MeshcopTlvType) -> Option<&[u8]> {
        self.tlvs()
            .find(|tlv| tlv.tlv_type == tlv_type as u8)
            .map(|tlv| tlv.value)
    }
}

impl Debug for OperationalDatasetTlvs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationalDatasetTlvs")
            .field("len", &self.len)
            .finish()
    }
}

impl PartialEq for OperationalDatasetTlvs {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for OperationalDatasetTlvs {}

#[cfg(test)]
mod test {
    use super::*;

    // The dataset of the `OpenThread-af16` test network used by the
    // ESP-IDF OpenThread examples
    const DATASET: &str = "0e080000000000010000000300000b35060004001fffe002084c14b4d26855fcd00708fdf7e918eb62e2a905107ca0e75a6ead4b960cfe073386943605030f4f70656e5468726561642d616631360102af1604102b9084b26c9a7d10a1a729bfc2e84ea00c0402a0f7f8";

    #[test]
    fn builds_the_reference_dataset() {
        let dataset = OperationalDatasetTlvs::from_hex(DATASET).unwrap();

        assert_eq!(dataset.len(), 106);
        assert!(!dataset.is_empty());
        assert_eq!(&dataset.as_slice()[..2], &[0x0e, 0x08]);
    }

    #[test]
    fn walks_all_tlv_records() {
        let dataset = OperationalDatasetTlvs::from_hex(DATASET).unwrap();

        let types = dataset.tlvs().map(|tlv| tlv.tlv_type).collect::<Vec<_>>();

        assert_eq!(
            types,
            &[0x0e, 0x00, 0x35, 0x02, 0x07, 0x05, 0x03, 0x01, 0x04, 0x0c]
        );

        let consumed = dataset
            .tlvs()
            .map(|tlv| 2 + tlv.value.len())
            .sum::<usize>();

        assert_eq!(consumed, dataset.len());
    }

    #[test]
    fn exposes_the_network_parameters() {
        let dataset = OperationalDatasetTlvs::from_hex(DATASET).unwrap();

        assert_eq!(dataset.network_name().unwrap().as_str(), "OpenThread-af16");
        assert_eq!(dataset.pan_id(), Some(0xaf16));
        assert_eq!(dataset.channel(), Some(11));
    }

    #[test]
    fn known_tlv_types_resolve() {
        let dataset = OperationalDatasetTlvs::from_hex(DATASET).unwrap();

        let active_timestamp = dataset.tlvs().next().unwrap();

        assert_eq!(
            active_timestamp.meshcop_type(),
            Some(MeshcopTlvType::ActiveTimestamp)
        );
        assert_eq!(MeshcopTlvType::try_from(0xfe_u8).ok(), None);
    }

    #[test]
    fn truncated_record_ends_the_walk() {
        // Claims 5 value bytes but carries only 1
        let dataset = OperationalDatasetTlvs::from_hex("0e05aa").unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.tlvs().count(), 0);
    }

    #[test]
    fn oversized_hex_is_rejected_before_decoding() {
        // Not even valid hex; the length check comes first
        let oversized = "z".repeat(MAX_DATASET_TLVS_LEN * 2 + 2);

        assert_eq!(
            OperationalDatasetTlvs::from_hex(&oversized),
            Err(DatasetError::TooLong(510))
        );
    }

    #[test]
    fn largest_dataset_still_fits() {
        let full = "ab".repeat(MAX_DATASET_TLVS_LEN);

        let dataset = OperationalDatasetTlvs::from_hex(&full).unwrap();

        assert_eq!(dataset.len(), MAX_DATASET_TLVS_LEN);
    }

    #[test]
    fn empty_hex_is_a_build_failure() {
        // The decoder accepts "" as zero bytes; the builder does not
        assert_eq!(
            OperationalDatasetTlvs::from_hex(""),
            Err(DatasetError::DecodeFailed)
        );
    }

    #[test]
    fn malformed_hex_is_a_build_failure() {
        assert_eq!(
            OperationalDatasetTlvs::from_hex(&DATASET[..DATASET.len() - 1]),
            Err(DatasetError::DecodeFailed)
        );
        assert_eq!(
            OperationalDatasetTlvs::from_hex("not-a-dataset"),
            Err(DatasetError::DecodeFailed)
        );
    }
}
