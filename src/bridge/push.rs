//! 拉转推适配器（PullToPush）模块。
//!
//! 把一个拉式读取器（`Stream<Item = Result<Bytes>>`）适配为推式流：
//! 下游的推式消费者通过 [`PushSource`] 契约（订阅、pause/resume）消费，
//! 得到与读取器产出完全一致的块序列——同样的顺序、每块恰好一次、
//! 终止信号恰好一次。
//!
//! ## 组合而非继承
//!
//! 适配器拆成两半，通过通道连接，而不是去"继承"某个流基类：
//!
//! - [`PushStream`]：消费端句柄，实现 [`PushSource`]。`subscribe` 把观察者
//!   经一次性通道交给泵（一次性注册）；`pause`/`resume` 向流控单元格写入
//!   状态。丢弃句柄即宣告消费端离开，泵随之停机。
//! - [`Pump`]：读循环，独占地持有读取器，是一个 `Future<Output = ()>`，
//!   由调用方负责驱动（通常 spawn 到执行器上）。
//!
//! ## 单飞约束
//!
//! 任一时刻至多一个在途读取。这由三点共同保证：读取器被泵独占、读循环是
//! 单一状态机、流控单元格只在状态**变化**时唤醒——一次读取在途期间，冗余
//! 的 `resume()` 不改变状态值，既不会唤醒泵，也不会触发重叠的读取。
//! 没有这层约束，消费端在上一条读取链尚未落定时反复索要数据，就可能造成
//! 乱序交付或对底层源的重复消费。
//!
//! ## 交付与暂停的衔接
//!
//! 每块交付前，泵先把流控单元格预置为暂停（"临时停车"），再调用
//! `on_data`：回调答复 [`Flow::Continue`] 则撤销停车、同步串入下一次读取；
//! 答复 [`Flow::Pause`] 则停在原地，直到消费端 `resume()`。交付期间到来的
//! `resume()` 不会丢失——它要么改写回运行态，要么唤醒本任务。

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_channel::oneshot;
use futures_core::{ready, Stream};
use pin_project_lite::pin_project;

use super::source::{BoxSubscriber, Chunk, Flow, PushSource, Subscriber};
use crate::common::watch;

// --- 流控单元格的状态值 ---

/// 消费端要求源静默，泵在下一次 `resume()` 之前不得读取
const FLOW_PAUSED: usize = 1;
/// 消费端放行，泵可以继续读取并交付
const FLOW_RUNNING: usize = 2;

/// 由拉式读取器适配而来的推式流（消费端句柄）。
///
/// 实现 [`PushSource`]：下游的推式消费者对它订阅、调用 pause/resume，
/// 与消费任何其他推式源无异。真正的读循环在配对的 [`Pump`] 里，
/// 两者经 [`PushStream::new`] 成对创建。
///
/// 丢弃句柄表示消费端放弃此流，配对的泵会在下一次被轮询时停机；
/// 除此之外没有显式的取消钩子——取消也可以由读取器自身结束来表达。
#[must_use = "the paired Pump does nothing until the handle is resumed"]
pub struct PushStream {
    /// 流控单元格的写入端：pause/resume 落在这里
    flow: watch::Sender,
    /// 一次性注册通道：首次 `subscribe` 把观察者交给泵后即耗尽
    register: Option<oneshot::Sender<BoxSubscriber>>,
}

pin_project! {
    /// 读循环泵：独占拉式读取器，把读到的块推给已注册的观察者。
    ///
    /// 这是一个 `Future<Output = ()>`，需要被驱动（通常 spawn 到执行器）。
    /// 它在以下任一情形下完成：读取器报告结束（`on_end` 恰好一次）、
    /// 读取器报告失败（`on_error` 恰好一次，错误原样转发）、或配对的
    /// [`PushStream`] 句柄被丢弃。完成即终态，不再发起任何读取。
    #[must_use = "futures do nothing unless polled"]
    pub struct Pump<R> {
        // 被独占的拉式读取器；单飞约束的所有权基础
        #[pin]
        reader: R,
        // 流控单元格的读取端：每轮读取前检查，等待时注册唤醒
        flow: watch::Receiver,
        // 观察者槽位：等待注册，或已绑定
        subscriber: Slot,
        // 终态标记。终止之后 poll 直接返回 Ready，读取器不再被触碰
        done: bool,
    }
}

/// 泵的观察者槽位。
enum Slot {
    /// 等待消费端完成一次性注册
    Pending(oneshot::Receiver<BoxSubscriber>),
    /// 观察者已绑定，读循环可以交付
    Bound(BoxSubscriber),
}

impl PushStream {
    /// 包装一个拉式读取器，返回 `(消费端句柄, 读循环泵)`。
    ///
    /// 新建的流处于暂停态：在句柄上完成订阅并调用 `resume()` 之前，
    /// 泵不会向读取器发起任何读取。泵必须由调用方驱动到完成。
    pub fn new<R>(reader: R) -> (PushStream, Pump<R>)
    where
        R: Stream<Item = crate::Result<Bytes>>,
    {
        let (register_tx, register_rx) = oneshot::channel();
        // 初始为暂停：消费端明确放行之前，一个字节都不读
        let (flow_tx, flow_rx) = watch::channel(FLOW_PAUSED);

        let handle = PushStream {
            flow: flow_tx,
            register: Some(register_tx),
        };
        let pump = Pump {
            reader,
            flow: flow_rx,
            subscriber: Slot::Pending(register_rx),
            done: false,
        };

        (handle, pump)
    }
}

impl PushSource for PushStream {
    fn subscribe(&mut self, subscriber: BoxSubscriber) {
        // 一次性注册：首次生效，后续调用被忽略（首个注册者获胜）
        if let Some(tx) = self.register.take() {
            // 泵先一步消失时注册失败，消费端后续也只会看到一个静默的流
            let _ = tx.send(subscriber);
            trace!("subscriber handed off to pump");
        }
    }

    fn pause(&mut self) {
        self.flow.send(FLOW_PAUSED);
    }

    fn resume(&mut self) {
        // 单元格只在值变化时唤醒泵：对运行中的泵重复 resume 是空操作
        self.flow.send(FLOW_RUNNING);
    }
}

/// 为 `PushStream` 实现 `Debug` trait。
///
/// 不暴露内部通道，仅显示句柄是否仍握着一次性注册额度。
impl fmt::Debug for PushStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct Subscribed;
        #[derive(Debug)]
        struct Unsubscribed;

        let mut builder = f.debug_tuple("PushStream");
        match self.register {
            Some(_) => builder.field(&Unsubscribed),
            None => builder.field(&Subscribed),
        };

        builder.finish()
    }
}

impl<R> Future for Pump<R>
where
    R: Stream<Item = crate::Result<Bytes>>,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(());
        }

        loop {
            // 流控闸门：只有运行态才继续。load 先注册唤醒再读值，
            // 间隙中的 resume() 不会丢失
            match this.flow.load(cx) {
                FLOW_RUNNING => {}
                FLOW_PAUSED => return Poll::Pending,
                watch::CLOSED => {
                    // 消费端句柄已被丢弃：流被放弃，停机
                    trace!("push handle dropped; pump shutting down");
                    *this.done = true;
                    return Poll::Ready(());
                }
                unexpected => unreachable!("flow cell value: {}", unexpected),
            }

            // 观察者必须已绑定（一次性注册）才能交付
            if let Slot::Pending(ref mut register) = *this.subscriber {
                match ready!(Pin::new(register).poll(cx)) {
                    Ok(subscriber) => {
                        *this.subscriber = Slot::Bound(subscriber);
                    }
                    // 句柄在注册之前就被丢弃，无人可通知
                    Err(_canceled) => {
                        *this.done = true;
                        return Poll::Ready(());
                    }
                }
            }
            let subscriber = match *this.subscriber {
                Slot::Bound(ref mut subscriber) => subscriber,
                Slot::Pending(_) => unreachable!("slot just bound"),
            };

            // 单飞读取：任一时刻至多一个在途的 read
            match ready!(this.reader.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => {
                    // 交付前预置暂停。交付期间到来的 resume() 要么把
                    // 单元格改写回运行态，要么唤醒本任务，不会丢失
                    this.flow.store(FLOW_PAUSED);
                    match subscriber.on_data(Chunk::Shared(bytes)) {
                        // 消费端还能收：撤销停车，同步串入下一次读取
                        Flow::Continue => this.flow.store(FLOW_RUNNING),
                        // 消费端饱和：停在原地，等 resume()
                        Flow::Pause => {}
                    }
                }
                Some(Err(err)) => {
                    // 错误按值原样转发，恰好一次；此后泵即终态
                    subscriber.on_error(err);
                    *this.done = true;
                    return Poll::Ready(());
                }
                None => {
                    // 读取器走完：结束信号恰好一次，此后泵即终态
                    subscriber.on_end();
                    trace!("reader finished; end delivered");
                    *this.done = true;
                    return Poll::Ready(());
                }
            }
        }
    }
}

/// 为 `Pump` 实现 `Debug` trait。
///
/// 不暴露读取器，仅显示泵所处的阶段（运行、停车或已完成）。
impl<R> fmt::Debug for Pump<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct Running;
        #[derive(Debug)]
        struct Parked;
        #[derive(Debug)]
        struct Finished;

        let mut builder = f.debug_tuple("Pump");
        if self.done {
            builder.field(&Finished);
        } else {
            match self.flow.peek() {
                FLOW_RUNNING => builder.field(&Running),
                _ => builder.field(&Parked),
            };
        }

        builder.finish()
    }
}

// ========== 测试模块 ==========
