//! Core primitives shared by every layer of the simulator

pub mod time;
