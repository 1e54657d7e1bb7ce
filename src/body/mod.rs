//! 数据输入归一化与规范体模块。
//!
//! 发送端（HTTP 请求体或 WebSocket 帧）只认各自的规范形态，而调用方
//! 手里的"数据"可能是文本、二进制缓冲、缓冲数组，也可能是任一范式的
//! 可读流。本模块把这些异构输入收拢为 [`Data`]，再按目标归一化：
//!
//! - [`prepare_body`]：归一化为规范体 [`NormalBody`]（实现
//!   `http_body::Body`），接受全部形态——流式输入保持流式，
//!   推式源先经 [`bridge`](crate::bridge) 的推转拉适配器；
//! - [`prepare_frame`]：归一化为单个完整的字节序列，流式输入同步拒绝。
//!
//! 归一化本身是无状态的一次性转换；真正有并发与顺序问题的部分都在
//! [`bridge`](crate::bridge) 模块里。

// --- 公开的 re-export ---

/// 从 `bytes` crate 重新导出 `Bytes`——本 crate 传递数据块的基本类型
pub use bytes::Bytes;
/// 从 `http_body` crate 重新导出核心 trait 和类型，
/// 方便下游直接消费 [`NormalBody`] 而无需单独添加依赖
pub use http_body::{Body, Frame, SizeHint};

/// 将本模块内部的类型与归一化入口公开导出
pub use self::data::{prepare_frame, Data};
pub use self::normal::{prepare_body, NormalBody};

// --- 子模块声明 ---

/// `data` 子模块：异构输入 `Data` 及帧方向的归一化
mod data;
/// `normal` 子模块：规范体 `NormalBody` 及请求体方向的归一化
mod normal;

/// 编译期静态断言函数，确保归一化产物可以跨任务移动。
///
/// 通过在泛型函数中要求 `T: Send` 约束，利用编译器在编译期验证。
/// 该函数永远不会被调用，仅用于触发编译期检查。
fn _assert_send() {
    fn _assert<T: Send>() {}

    _assert::<Data>();
    _assert::<NormalBody>();
}
