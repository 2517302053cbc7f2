//! Example of configuring a sleepy Thread node.
//!
//! The example drives the bring-up sequence of a low-power node against a
//! stand-in stack that just prints the calls it receives. On a device the
//! [`ThreadControl`] implementation would wrap the vendor Thread stack and
//! the same sequence would attach the node to the mesh.

use enumset::EnumSet;

use ot_node_config::dataset::OperationalDatasetTlvs;
use ot_node_config::node::{LinkMode, NodeConfig, ThreadControl};

/// The dataset of the `OpenThread-af16` test network
const DATASET: &str = "0e080000000000010000000300000b35060004001fffe002084c14b4d26855fcd00708fdf7e918eb62e2a905107ca0e75a6ead4b960cfe073386943605030f4f70656e5468726561642d616631360102af1604102b9084b26c9a7d10a1a729bfc2e84ea00c0402a0f7f8";

fn main() -> anyhow::Result<()> {
    let mut stack = PrintingStack;

    let conf = NodeConfig::new(DATASET);

    conf.apply(&mut stack)?;

    let dataset = OperationalDatasetTlvs::from_hex(DATASET)?;

    println!(
        "Joined network {:?}: PAN ID {:04x?}, channel {:?}",
        dataset.network_name().unwrap_or_default(),
        dataset.pan_id(),
        dataset.channel()
    );

    Ok(())
}

/// A stand-in for the vendor Thread stack bindings.
struct PrintingStack;

impl ThreadControl for PrintingStack {
    type Error = core::convert::Infallible;

    fn set_poll_period(&mut self, period_ms: u32) -> Result<(), Self::Error> {
        println!("Poll period set to {period_ms} ms");
        Ok(())
    }

    fn set_link_mode(&mut self, mode: EnumSet<LinkMode>) -> Result<(), Self::Error> {
        println!("Link mode set to {mode:?}");
        Ok(())
    }

    fn set_active_dataset(&mut self, dataset: &OperationalDatasetTlvs) -> Result<(), Self::Error> {
        println!("Active dataset set ({} TLV bytes)", dataset.len());
        Ok(())
    }

    fn enable_ipv6(&mut self, enabled: bool) -> Result<(), Self::Error> {
        println!("IPv6 interface enabled: {enabled}");
        Ok(())
    }

    fn enable_thread(&mut self, enabled: bool) -> Result<(), Self::Error> {
        println!("Thread protocol enabled: {enabled}");
        Ok(())
    }
}
