//! 推式可读流的能力契约模块。
//!
//! 推式范式里，生产者决定何时发射数据。本模块把这一范式固化为一组显式的
//! 能力 trait，而不是依赖某种通用的事件分发机制：观察者（[`Subscriber`]）
//! 拥有三个回调槽位——数据、结束、错误——在适配器构造时一次性注册到源
//! （[`PushSource`]）上；流控则拆成两条通道：
//!
//! - **块粒度**：每次 `on_data` 的返回值 [`Flow`] 告诉源下一块是否可以
//!   立即跟上。合规的源在收到 [`Flow::Pause`] 后必须停止发射，直到
//!   `resume()` 被调用。
//! - **命令式**：[`PushSource::pause`]/[`PushSource::resume`] 供消费端在
//!   回调之外（例如下游拉取到来时）控制源的启停。
//!
//! ## 所有权边界
//!
//! 适配器只在转换期间借道源的流控，不负责源的销毁；取消消费时只调用
//! `pause()`，已注册的观察者保持挂接，由源的所有者决定何时拆除。
//!
//! ## 独占约束
//!
//! 一个源的 pause/resume 只能由一个消费者驱动。把同一个源同时交给两个
//! 适配器属于误用，流控不变量会被破坏；crate 不对此做主动防护。

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::Error;

/// 推式源发射的一个数据块。
///
/// 两种二进制表示形态在此统一：装箱形态（仍持有可写所有权的
/// [`BytesMut`]）与冻结的原始字节视图（[`Bytes`]）。适配器在转发前
/// 对每块做恰好一次显式解包（[`Chunk::into_bytes`]）；已是原始视图的
/// 块原样通过，不做任何变换。
#[derive(Debug)]
pub enum Chunk {
    /// 装箱形态：仍可写的所有权缓冲，转发前需冻结为原始字节视图
    Owned(BytesMut),
    /// 原始字节视图：已冻结，可零拷贝地直接转发
    Shared(Bytes),
}

impl Chunk {
    /// 解包为原始字节视图。
    ///
    /// 装箱形态经 `freeze()` 冻结（零拷贝，仅转移所有权语义）；
    /// 原始视图形态原样返回。
    pub fn into_bytes(self) -> Bytes {
        match self {
            Chunk::Owned(owned) => owned.freeze(),
            Chunk::Shared(shared) => shared,
        }
    }

    /// 返回块中的字节数。
    pub fn len(&self) -> usize {
        match self {
            Chunk::Owned(owned) => owned.len(),
            Chunk::Shared(shared) => shared.len(),
        }
    }

    /// 块是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Bytes> for Chunk {
    fn from(bytes: Bytes) -> Chunk {
        Chunk::Shared(bytes)
    }
}

impl From<BytesMut> for Chunk {
    fn from(bytes: BytesMut) -> Chunk {
        Chunk::Owned(bytes)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Chunk {
        Chunk::Shared(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(bytes: &'static [u8]) -> Chunk {
        Chunk::Shared(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for Chunk {
    fn from(text: &'static str) -> Chunk {
        Chunk::Shared(Bytes::from_static(text.as_bytes()))
    }
}

/// `on_data` 的返回值：消费端对下一块数据的流控裁决。
///
/// 这是块粒度背压的返回通道：暂停信号随回调的返回值原路传回源，
/// 而不需要源暴露可重入的方法调用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// 消费端可以立即接收更多数据，源应继续发射
    Continue,
    /// 消费端暂时饱和，源必须停止发射，直到 `resume()` 被调用
    Pause,
}

/// 推式源的观察者：三个回调槽位，在适配器构造时一次性注册。
///
/// 源对每个数据块调用一次 `on_data`；流正常走完时调用恰好一次
/// `on_end`，失败时调用恰好一次 `on_error`——两者互斥，且此后源
/// 不得再发出任何通知。
pub trait Subscriber {
    /// 一个数据块到达。返回值告诉源下一块是否可以立即跟上；
    /// 返回 [`Flow::Pause`] 后，源必须静默直到 `resume()`。
    fn on_data(&mut self, chunk: Chunk) -> Flow;

    /// 流正常结束。终止信号，之后不会再有任何通知。
    fn on_end(&mut self);

    /// 流因失败终止。错误是一次性的、终止性的；源的实现者用
    /// [`Error::new_source`](crate::Error::new_source) 包装底层原因，
    /// 适配器将原样转发、不重试、不二次包装。
    fn on_error(&mut self, err: Error);
}

/// 装箱的观察者，注册到源上时使用的统一形态。
pub type BoxSubscriber = Box<dyn Subscriber + Send>;

/// 推式可读流的能力契约。
///
/// 任何"生产者主动发射数据块、消费者以 pause/resume 节流"的源都可以
/// 实现此 trait，接入推转拉适配器 [`PullStream`](crate::bridge::PullStream)。
///
/// ## 实现者须知
///
/// - `subscribe` 在整个生命周期内只会被调用一次（适配器构造时）；
///   重复注册属于误用，实现者可以忽略后续调用。
/// - 新建的源应处于暂停状态，或者至少在第一次 `resume()` 之前不发射
///   数据；适配器在订阅前还会显式调用一次 `pause()` 兜底。
/// - 收到 `pause()` 或 `on_data` 返回 [`Flow::Pause`] 后必须停止发射，
///   直到下一次 `resume()`。短暂的惯性超发是可容忍的——适配器侧的
///   邮箱会完整吸收，不会丢块——但持续无视暂停会使背压失效。
pub trait PushSource {
    /// 注册观察者。只会被调用一次，在适配器构造时发生。
    fn subscribe(&mut self, subscriber: BoxSubscriber);

    /// 要求源停止发射数据，直到下一次 `resume()`。
    fn pause(&mut self);

    /// 放行源，允许数据（或终止信号）继续流出。
    fn resume(&mut self);
}

/// 装箱的推式源，归一化层承载"未知具体类型的推式流"时使用的统一形态。
pub type BoxPushSource = Box<dyn PushSource + Send>;

/// 装箱的推式源按委托转发全部能力调用。
impl<S: PushSource + ?Sized> PushSource for Box<S> {
    fn subscribe(&mut self, subscriber: BoxSubscriber) {
        (**self).subscribe(subscriber)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }
}

impl fmt::Debug for dyn Subscriber + Send {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscriber")
    }
}

impl fmt::Debug for dyn PushSource + Send {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushSource")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 装箱形态解包后得到的字节序列与写入内容一致。
    #[test]
    fn owned_chunk_freezes_to_bytes() {
        let mut owned = BytesMut::with_capacity(8);
        owned.extend_from_slice(b"abc");
        let chunk = Chunk::from(owned);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.into_bytes(), Bytes::from_static(b"abc"));
    }

    /// 原始字节视图原样通过，不发生拷贝。
    #[test]
    fn shared_chunk_passes_through() {
        let bytes = Bytes::from_static(b"xyz");
        let ptr = bytes.as_ptr();
        let out = Chunk::from(bytes).into_bytes();
        assert!(std::ptr::eq(ptr, out.as_ptr()));
    }
}
