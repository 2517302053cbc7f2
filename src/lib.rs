#![cfg_attr(not(feature = "std"), no_std)]

pub mod dataset;
pub mod hex;
pub mod node;
