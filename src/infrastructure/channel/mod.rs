//! Live subscription channel over a Phoenix-style websocket

mod client;
mod frame;

pub use client::{run_channel, ChannelConfig, ChannelEvent};
pub use frame::{classify, Frame, Inbound};
