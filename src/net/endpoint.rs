//! 端点标识
//!
//! 信道只连接一对收发端，数据包的目的地只可能是二者之一。

use serde::{Deserialize, Serialize};

/// 数据包目的端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Sender,
    Receiver,
}
