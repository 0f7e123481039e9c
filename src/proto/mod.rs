//! 协议实现
//!
//! Go-Back-N 的发送端与接收端状态机。两者都不持有信道，
//! 由驱动器在每个 tick 把信道借给它们。

pub mod receiver;
pub mod sender;

pub use receiver::{AckResend, DataVerdict, GbnReceiver};
pub use sender::{BURST_GAP, GbnSender, Transmission};
