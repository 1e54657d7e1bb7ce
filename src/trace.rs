//! 日志追踪（tracing）宏模块
//!
//! 本模块为 stream-bridge 提供了统一的日志和追踪（tracing）基础设施。
//! 它对 `tracing` crate 的公共日志宏进行了条件包装，使得：
//!
//! 1. 当 `tracing` feature 启用时，宏会展开为实际的 `tracing::*` 调用
//! 2. 当 `tracing` feature 未启用时，宏展开为空操作（零成本抽象）
//!
//! ## 在 stream-bridge 中的角色
//!
//! 本模块通过 `#[macro_use]` 在 `lib.rs` 中最先被引入，使得整个 crate 内的
//! 代码都可以直接使用 `trace!`、`debug!` 等宏，而无需关心 `tracing` feature
//! 是否启用。适配器只在生命周期的边界（构造、订阅、终止）打少量诊断日志；
//! 失败路径本身不记日志——错误被原样转发给下游，由调用方决定如何呈现。
//!
//! ## 不稳定特性
//!
//! `tracing` feature 被标记为不稳定特性（unstable），需要同时设置
//! `RUSTFLAGS='--cfg stream_bridge_unstable_tracing'` 才能使用。
//! 这通过下面的 `compile_error!` 宏实现编译时检查。

// 为了完整性，即使某些宏当前未被使用，也提供了对 tracing 公共日志宏的封装。
// 此属性抑制"未使用宏"的编译警告。
#![allow(unused_macros)]

// 编译时安全检查：如果用户在 Cargo.toml 中启用了 `tracing` feature，
// 但没有设置 `--cfg stream_bridge_unstable_tracing` 编译标志，则产生编译错误。
// 这是对不稳定特性的保护机制——确保用户明确知道自己在使用不稳定 API。
#[cfg(all(not(stream_bridge_unstable_tracing), feature = "tracing"))]
compile_error!(
    "\
    The `tracing` feature is unstable, and requires the \
    `RUSTFLAGS='--cfg stream_bridge_unstable_tracing'` environment variable to be set.\
"
);

/// `debug!` —— 调试级别日志宏
///
/// 当 `tracing` feature 启用时，转发到 `tracing::debug!`；否则为空操作。
/// 用于记录有助于调试但在正常运行时不需要的信息。
macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)+);
        }
    }
}

/// `error!` —— 错误级别日志宏
///
/// 当 `tracing` feature 启用时，转发到 `tracing::error!`；否则为空操作。
macro_rules! error {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::error!($($arg)+);
        }
    }
}

/// `trace!` —— 追踪级别日志宏
///
/// 当 `tracing` feature 启用时，转发到 `tracing::trace!`；否则为空操作。
/// 这是最细粒度的日志级别，在 crate 内部用于追踪适配器生命周期的每个边界。
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)+);
        }
    }
}

/// `warn!` —— 警告级别日志宏
///
/// 当 `tracing` feature 启用时，转发到 `tracing::warn!`；否则为空操作。
/// 用于记录潜在的问题或需要注意的情况。
macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)+);
        }
    }
}
