//! 网络模拟模块
//!
//! 此模块包含数据包、端点和信道（时延 + 一次性丢包）模型。

// 子模块声明
mod channel;
mod endpoint;
mod packet;

// 重新导出公共接口
pub use channel::{Channel, InFlight, SendOutcome};
pub use endpoint::Endpoint;
pub use packet::{Packet, PacketKind};
