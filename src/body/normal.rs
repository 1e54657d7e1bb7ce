//! 规范体（`NormalBody`）模块。
//!
//! [`NormalBody`] 是归一化的终点：任何 [`Data`] 输入经
//! [`prepare_body`] 都落到两种规范形态之一——
//!
//! - **完整载荷**（`Full`）：文本、单段二进制、缓冲数组在内存中合并为
//!   一个有界的字节序列，长度提示精确；
//! - **流式载荷**（`Streaming`）：拉式流原样透传，推式流先经推转拉
//!   适配器包装。传输层只讲拉式契约，所以归一化方向是"一切流都拉式"。
//!
//! `NormalBody` 实现 `http_body::Body`：任何讲标准 body 契约的传输层
//! 都可以直接消费它，本 crate 不实现请求/响应语义。

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::ready;
use http_body::{Body, Frame, SizeHint};

use super::data::{concat, Data};
use crate::bridge::{BoxPullStream, PullStream};

/// 归一化后的规范体，HTTP 请求体发送端可直接接受的形态。
///
/// 通过 [`prepare_body`] 构造。完整载荷一次性产出一个数据帧；
/// 流式载荷逐块产出，上游的失败原样作为帧错误浮出。
// `#[must_use]` 属性：提醒用户 body 如果不被轮询则不会产生任何效果
#[must_use = "bodies do nothing unless polled"]
pub struct NormalBody {
    /// 内部使用枚举 `Kind` 来区分两种规范形态
    kind: Kind,
}

/// `NormalBody` 的内部表示枚举。
enum Kind {
    /// 完整的内存载荷。`None` 表示载荷为空或已被取走
    Full(Option<Bytes>),
    /// 流式载荷：装箱的拉式流
    Streaming(BoxPullStream),
}

impl NormalBody {
    /// 以完整的内存载荷构造。空载荷直接落到"已结束"状态。
    fn full(bytes: Bytes) -> NormalBody {
        let payload = if bytes.is_empty() { None } else { Some(bytes) };
        NormalBody {
            kind: Kind::Full(payload),
        }
    }

    /// 以拉式流构造。
    fn streaming(stream: BoxPullStream) -> NormalBody {
        NormalBody {
            kind: Kind::Streaming(stream),
        }
    }
}

/// 把任意数据输入归一化为规范体。
///
/// 文本与二进制成为完整载荷；缓冲数组拼接为完整载荷（单段时零拷贝）；
/// 拉式流透传；推式流经推转拉适配器包装。所有形态都受支持，
/// 因此与帧方向的 [`prepare_frame`](super::prepare_frame) 不同，
/// 此归一化不会失败。
pub fn prepare_body<D>(data: D) -> NormalBody
where
    D: Into<Data>,
{
    match data.into() {
        Data::Text(text) => NormalBody::full(Bytes::from(text)),
        Data::Binary(bytes) => NormalBody::full(bytes),
        Data::Chunks(chunks) => NormalBody::full(concat(chunks)),
        Data::Pull(stream) => NormalBody::streaming(stream),
        // 传输层只讲拉式契约：推式源先过推转拉适配器
        Data::Push(source) => NormalBody::streaming(Box::pin(PullStream::new(source))),
    }
}

/// 为 `NormalBody` 实现 `http_body::Body` trait。
///
/// 完整载荷产出恰好一个数据帧后结束；流式载荷把每次 pull 翻译为一帧。
/// 本 crate 的数据模型没有 trailers，`poll_frame` 只产出数据帧。
impl Body for NormalBody {
    type Data = Bytes;
    type Error = crate::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut().kind {
            // 完整载荷：取走即结束
            Kind::Full(ref mut payload) => {
                Poll::Ready(payload.take().map(|bytes| Ok(Frame::data(bytes))))
            }
            // 流式载荷：一次 pull 一帧，错误原样浮出
            Kind::Streaming(ref mut stream) => match ready!(stream.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                Some(Err(err)) => Poll::Ready(Some(Err(err))),
                None => Poll::Ready(None),
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        match self.kind {
            Kind::Full(ref payload) => payload.is_none(),
            // 流式载荷的终止只能通过 pull 观察到
            Kind::Streaming(_) => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self.kind {
            Kind::Full(ref payload) => {
                SizeHint::with_exact(payload.as_ref().map_or(0, |bytes| bytes.len() as u64))
            }
            Kind::Streaming(_) => SizeHint::default(),
        }
    }
}

/// 为 `NormalBody` 实现 `Debug` trait。
///
/// 不输出载荷内容，仅显示规范形态（Full 或 Streaming）。
impl fmt::Debug for NormalBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct Full;
        #[derive(Debug)]
        struct Streaming;

        let mut builder = f.debug_tuple("NormalBody");
        match self.kind {
            Kind::Full(_) => builder.field(&Full),
            Kind::Streaming(_) => builder.field(&Streaming),
        };

        builder.finish()
    }
}

// ========== 测试模块 ==========
