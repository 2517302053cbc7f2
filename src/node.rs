use core::fmt::{self, Debug, Display, Formatter};

use enumset::{EnumSet, EnumSetType};
use log::{debug, info};

use crate::dataset::{DatasetError, OperationalDatasetTlvs};

/// Default data poll period for a sleepy end device, in milliseconds.
pub const DEFAULT_POLL_PERIOD_MS: u32 = 3000;

/// Link mode flags a node advertises to its parent.
///
/// A sleepy end device keeps all flags cleared: its radio is off while idle
/// and it polls its parent for pending frames instead.
#[derive(Debug, EnumSetType)]
pub enum LinkMode {
    /// Keep the receiver on while idle
    RxOnWhenIdle,
    /// Operate as a Full Thread Device
    FullThreadDevice,
    /// Request the full Network Data from the parent
    FullNetworkData,
}

/// Startup configuration of a low-power Thread node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NodeConfig<'a> {
    /// Operational dataset of the network to attach to, as a hex string
    pub dataset: &'a str,
    /// Data poll period, in milliseconds
    pub poll_period_ms: u32,
    /// Link mode flags; leave empty for a sleepy end device
    pub link_mode: EnumSet<LinkMode>,
}

impl<'a> NodeConfig<'a> {
    /// Create a sleepy-end-device configuration for the network described
    /// by `dataset`, polling every [`DEFAULT_POLL_PERIOD_MS`] milliseconds.
    pub const fn new(dataset: &'a str) -> Self {
        Self {
            dataset,
            poll_period_ms: DEFAULT_POLL_PERIOD_MS,
            link_mode: EnumSet::empty(),
        }
    }

    /// Apply the configuration to `stack` and start the protocol.
    ///
    /// The calls follow the bring-up order a Thread node needs: poll period
    /// and link mode first, then the active dataset, and only then the IPv6
    /// interface and the protocol itself. The sequence stops at the first
    /// failure, so a node never comes up with a partially applied network
    /// configuration.
    pub fn apply<T: ThreadControl>(&self, stack: &mut T) -> Result<(), ConfigError<T::Error>> {
        debug!(
            "Configuring node: poll period {} ms, link mode {:?}",
            self.poll_period_ms, self.link_mode
        );

        stack
            .set_poll_period(self.poll_period_ms)
            .map_err(ConfigError::Stack)?;
        stack
            .set_link_mode(self.link_mode)
            .map_err(ConfigError::Stack)?;

        let dataset = OperationalDatasetTlvs::from_hex(self.dataset)?;

        stack
            .set_active_dataset(&dataset)
            .map_err(ConfigError::Stack)?;
        stack.enable_ipv6(true).map_err(ConfigError::Stack)?;
        stack.enable_thread(true).map_err(ConfigError::Stack)?;

        info!("Node configured ({} dataset TLV bytes)", dataset.len());

        Ok(())
    }
}

/// The part of the Thread stack control surface a node touches while
/// bringing itself up.
///
/// On a device this is implemented over the vendor stack's bindings;
/// tests implement it in memory.
pub trait ThreadControl {
    type Error: Debug;

    /// Set the data poll period, in milliseconds
    fn set_poll_period(&mut self, period_ms: u32) -> Result<(), Self::Error>;

    /// Advertise the device's link mode flags
    fn set_link_mode(&mut self, mode: EnumSet<LinkMode>) -> Result<(), Self::Error>;

    /// Install `dataset` as the active operational dataset
    fn set_active_dataset(
        &mut self,
        dataset: &OperationalDatasetTlvs,
    ) -> Result<(), Self::Error>;

    /// Bring the IPv6 interface up or down
    fn enable_ipv6(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Start or stop Thread protocol operation
    fn enable_thread(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

/// Errors reported while applying a [`NodeConfig`].
///
/// Both variants mean the node must not proceed with startup; whether that
/// aborts the device or retries with another configuration is the caller's
/// decision.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ConfigError<E> {
    /// The configured dataset hex string could not be turned into TLVs
    Dataset(DatasetError),
    /// The Thread stack rejected one of the configuration calls
    Stack(E),
}

impl<E> From<DatasetError> for ConfigError<E> {
    fn from(err: DatasetError) -> Self {
        Self::Dataset(err)
    }
}

impl<E: Debug> Display for ConfigError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(err) => write!(f, "Dataset error: {err}"),
            Self::Stack(err) => write!(f, "Thread stack error: {err:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for ConfigError<E> {}
