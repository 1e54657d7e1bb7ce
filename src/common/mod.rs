//! stream-bridge 公共工具模块（common）。
//!
//! 本模块汇集了 crate 内部各处共用的基础工具类型和子模块，包括：
//! - 缓冲区管理（`buf`）
//! - 流控单元格：单生产者单消费者的状态通知通道（`watch`）
//!
//! 所有子模块均为 `pub(crate)` 可见性，仅供 crate 内部使用，不对外暴露。

/// 缓冲区列表模块，提供 `BufList` 类型，用于高效拼接多段连续缓冲区。
/// 归一化层在把缓冲数组合并为单个字节序列时使用它。
pub(crate) mod buf;
/// 单生产者单消费者（SPSC）状态通知通道模块，拉转推适配器用它在
/// 消费端句柄与读循环泵之间传递 pause/resume 流控状态。
pub(crate) mod watch;
