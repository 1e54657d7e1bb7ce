// 以下 lint 属性控制编译器的警告行为，确保代码质量：
#![deny(missing_docs)]                     // 所有公共 API 必须有文档注释
#![deny(missing_debug_implementations)]    // 所有公共类型必须实现 Debug trait
#![cfg_attr(test, deny(rust_2018_idioms))] // 测试时要求使用 Rust 2018 惯用写法
#![cfg_attr(docsrs, feature(doc_cfg))]     // docs.rs 构建时启用 doc_cfg feature

//! # stream-bridge
//!
//! 网络 I/O 中常见的两种可读流抽象互不兼容：
//!
//! - **推式（push-based）可读流**：生产者通过通知回调主动发射数据块，
//!   消费者只能通过 `pause`/`resume` 进行流控；
//! - **拉式（pull-based）可读流**：消费者每次主动发起一个异步读取，
//!   拿到 `{done, value}` 式的结果（在 Rust 中即 `futures_core::Stream`）。
//!
//! 本 crate 提供两者之间的双向适配器，在跨越范式边界时保持：
//!
//! - 背压（backpressure）——慢的消费端不会被快的生产端淹没；
//! - 顺序与完整性——数据块不丢失、不重复、不乱序；
//! - 终止与错误的一次性传播——`end`/`error` 信号原样转发，恰好一次。
//!
//! 此外还提供把异构的"数据"输入（文本、二进制缓冲、缓冲数组、任一范式的流）
//! 归一化为 HTTP 请求体或 WebSocket 帧发送端可直接接受的规范形态。
//!
//! ## 模块导览
//!
//! - [`bridge`]：核心——推转拉的 [`bridge::PullStream`]、
//!   拉转推的 [`bridge::PushStream`] 与其驱动泵 [`bridge::Pump`]，
//!   以及推式范式的能力契约（[`bridge::PushSource`]、[`bridge::Subscriber`]）。
//! - [`body`]：输入归一化——[`body::Data`] 与规范体 [`body::NormalBody`]
//!   （实现 `http_body::Body`，可直接交给任何讲标准 body 契约的传输层）。
//!
//! ## 不稳定特性
//!
//! `tracing` feature 属于不稳定特性，启用时还必须设置
//! `RUSTFLAGS="--cfg stream_bridge_unstable_tracing"`，
//! 否则会产生编译错误（见 `src/trace.rs` 中的守卫）。
//!
//! ## 适用范围
//!
//! 本 crate 是一个底层构件：它不实现网络传输，不定义任何线协议，
//! 也不提供流的变换/映射算子——只做类型边界的适配与流控语义的翻译。

// 从内部 error 模块重新导出 Error 和 Result 类型，
// 使其成为 crate 的顶级公共 API。
pub use crate::error::{Error, Result};

// `#[macro_use]` 使得 trace 模块中定义的日志宏（trace!、debug! 等）
// 在整个 crate 中可用。此模块必须最先声明，因为后续模块依赖这些宏。
#[macro_use]
mod trace;

pub mod body;
pub mod bridge;
// 内部通用工具模块（缓冲区列表、watch 通道）。
mod common;
// 错误类型模块，通过上面的 `pub use` 导出公共 API。
mod error;
// 测试用的脚本化流替身模块，仅在测试时编译。
#[cfg(test)]
mod mock;
