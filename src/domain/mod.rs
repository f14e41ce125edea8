//! Domain model: orders, their state machine, and the ports the workflow
//! talks through.

pub mod chat;
pub mod decision;
pub mod order;
pub mod ports;
pub mod price;
pub mod reference;
