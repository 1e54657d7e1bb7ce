//! 推转拉适配器（PushToPull）模块。
//!
//! [`PullStream`] 把一个推式源（[`PushSource`]）包装成拉式流
//! （`futures_core::Stream`），消费到的字节序列与源发射的序列完全一致：
//! 同样的块、同样的顺序，不丢失、不重复，并与源同步终止。
//!
//! ## 流控策略
//!
//! 适配器不维护显式的深缓冲，背压直接建立在源自己的 pause/resume 之上：
//!
//! 1. 构造时立即暂停源——消费者索要数据之前，源一个字节都不许发
//!    （防止 pull 之前的竞态造成无界内部堆积）；
//! 2. 注册的观察者把每个到达的块解包为原始字节视图后投入邮箱，并以
//!    [`Flow::Pause`] 作答——一块一拉，源永远跑不到消费者前面去；
//! 3. 每次 `poll_next` 发现邮箱为空时 `resume()` 一次，恰好放行一块
//!    （或 end/error）。
//!
//! 一块一暂停的粒度是有意的策略取舍：用吞吐换简单性。邮箱采用无界通道，
//! 对于在观察到暂停信号前惯性超发的源，短暂的突发会被完整吸收，顺序与
//! 完整性不受影响。
//!
//! ## 失败语义
//!
//! 源的错误通知被一次性、终止性地原样转发；流不可恢复，终止之后的
//! `poll_next` 是空操作，且不会再触碰源。

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_channel::mpsc;
use futures_core::stream::FusedStream;
use futures_core::Stream;
use pin_project_lite::pin_project;

use super::source::{Chunk, Flow, PushSource, Subscriber};
use crate::Error;

pin_project! {
    /// 由推式源适配而来的拉式流。
    ///
    /// 独占地持有源：转换期间源的 pause/resume 完全由本适配器驱动，
    /// 其他消费者不得并发操纵同一个源的流控。通过 [`PullStream::cancel`]
    /// 可以归还源的所有权。
    #[must_use = "streams do nothing unless polled"]
    pub struct PullStream<S> {
        // 被适配的推式源。适配器只借道它的流控，不负责销毁
        source: S,
        // 邮箱接收端：观察者投递的块（或终止性错误）从这里取出。
        // 通道关闭即流终止
        rx: mpsc::UnboundedReceiver<crate::Result<Bytes>>,
    }
}

/// 邮箱观察者：[`PullStream`] 构造时一次性注册到源上的 [`Subscriber`]。
///
/// 它只做三件事：解包、投递、回答暂停。所有流控决策都在 `poll_next`
/// 一侧，观察者本身无状态。
struct Mailbox {
    tx: mpsc::UnboundedSender<crate::Result<Bytes>>,
}

impl Subscriber for Mailbox {
    fn on_data(&mut self, chunk: Chunk) -> Flow {
        // 装箱形态在此做恰好一次解包；原始视图原样通过。
        // 接收端已被丢弃时投递失败，忽略即可——消费者已经离开了
        let _ = self.tx.unbounded_send(Ok(chunk.into_bytes()));
        // 一块一拉：收下这块后立即要求源暂停，直到下一次 pull
        Flow::Pause
    }

    fn on_end(&mut self) {
        // 关闭通道即向消费者宣告流结束；已投递的块仍可全部取出
        self.tx.close_channel();
    }

    fn on_error(&mut self, err: Error) {
        // 错误原样转发（不包装、不改写），随后关闭通道：
        // 失败是一次性的终止信号
        let _ = self.tx.unbounded_send(Err(err));
        self.tx.close_channel();
    }
}

impl<S: PushSource> PullStream<S> {
    /// 包装一个推式源，返回拉式流。
    ///
    /// 源被立即暂停，然后一次性注册内部观察者。在第一次
    /// [`poll_next`](Stream::poll_next) 之前，源不会收到任何放行信号。
    pub fn new(mut source: S) -> PullStream<S> {
        let (tx, rx) = mpsc::unbounded();

        // 先暂停再订阅：订阅瞬间源就可能发射，暂停必须抢在前面
        source.pause();
        source.subscribe(Box::new(Mailbox { tx }));
        trace!("push source adapted to pull; source paused until first poll");

        PullStream { source, rx }
    }

    /// 放弃消费，归还源的所有权。
    ///
    /// 源被暂停，不会再被索要数据。已注册的观察者保持挂接——
    /// 适配器不负责源的拆除，所有权边界在调用方。
    pub fn cancel(self) -> S {
        let PullStream { mut source, rx } = self;
        drop(rx);
        source.pause();
        trace!("pull side canceled; source paused and handed back");
        source
    }
}

impl<S: PushSource> Stream for PullStream<S> {
    type Item = crate::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        // 终止后的 pull 是空操作：直接回答"流已结束"，不再触碰源
        if this.rx.is_terminated() {
            return Poll::Ready(None);
        }

        match Pin::new(&mut *this.rx).poll_next(cx) {
            Poll::Ready(item) => Poll::Ready(item),
            Poll::Pending => {
                // 邮箱已空：放行源，允许恰好再流入一块（或 end/error）。
                // 唤醒已在上面的 poll_next 中注册，源同步发射也不会丢信号
                this.source.resume();
                Poll::Pending
            }
        }
    }
}

impl<S: PushSource> FusedStream for PullStream<S> {
    fn is_terminated(&self) -> bool {
        self.rx.is_terminated()
    }
}

impl<S> std::fmt::Debug for PullStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullStream")
            .field("terminated", &self.rx.is_terminated())
            .finish()
    }
}

// ========== 测试模块 ==========
