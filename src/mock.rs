//! 测试用的脚本化流替身模块，仅在测试时编译。
//!
//! 适配器的可测性依赖于对"边界另一侧"的精确控制：
//!
//! - [`ScriptedSource`]：按脚本发射的推式源，带共享计数器
//!   （数据通知数、放行数、暂停数），用于断言背压与放行粒度。
//!   可配置为在观察到暂停信号前惯性超发的"突发"源。
//! - [`ScriptedReader`]：按脚本应答的拉式读取器，记录被轮询的次数，
//!   用于断言单飞约束（一次读取在途时不得有第二次）。
//! - [`Recorder`]：把收到的每个通知按序记入 [`Recording`] 的观察者，
//!   以固定的 [`Flow`] 裁决作答。
//!
//! 所有计数器与记录通过 `Arc` 共享：替身本体交给适配器独占后，
//! 测试仍能从外部观察它的遭遇。

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

use crate::bridge::{BoxSubscriber, Chunk, Flow, PushSource, Subscriber};
use crate::Error;

// ========== 推式源替身 ==========

/// 源脚本的一步。
pub(crate) enum Step {
    /// 发射一个数据块
    Data(Chunk),
    /// 本次放行什么都不给（消费一步脚本后保持静默）
    Quiet,
    /// 正常结束
    End,
    /// 以失败终止
    Error(Error),
}

impl Step {
    /// 以静态文本构造一个数据步骤。
    pub(crate) fn data(text: &'static str) -> Step {
        Step::Data(Chunk::from(text))
    }
}

/// 按脚本发射的推式源。
///
/// 脚本仅在"未暂停"期间推进：`resume()` 触发交付循环，循环在脚本
/// 耗尽、遇到静默步骤、流终止、或被要求暂停时停下。
pub(crate) struct ScriptedSource {
    script: VecDeque<Step>,
    subscriber: Option<BoxSubscriber>,
    paused: bool,
    /// 还可以无视多少次 `Flow::Pause`（突发模式）
    burst: usize,
    log: SourceLog,
}

/// 源替身的共享观察窗口。
#[derive(Clone)]
pub(crate) struct SourceLog {
    inner: Arc<SourceCounters>,
}

struct SourceCounters {
    data_notifications: AtomicUsize,
    resumes: AtomicUsize,
    pauses: AtomicUsize,
}

impl SourceLog {
    /// 已发出的数据通知总数。
    pub(crate) fn data_notifications(&self) -> usize {
        self.inner.data_notifications.load(Ordering::SeqCst)
    }

    /// 收到的 `resume()` 调用总数。
    pub(crate) fn resumes(&self) -> usize {
        self.inner.resumes.load(Ordering::SeqCst)
    }

    /// 收到的 `pause()` 调用总数。
    pub(crate) fn pauses(&self) -> usize {
        self.inner.pauses.load(Ordering::SeqCst)
    }
}

/// 创建一个循规蹈矩的脚本源：每次 `Flow::Pause` 都被立即遵守。
pub(crate) fn source(script: Vec<Step>) -> (ScriptedSource, SourceLog) {
    bursty_source(script, 0)
}

/// 创建一个突发脚本源：前 `burst` 次 `Flow::Pause` 被无视，
/// 模拟在观察到暂停信号前惯性超发的源。
pub(crate) fn bursty_source(script: Vec<Step>, burst: usize) -> (ScriptedSource, SourceLog) {
    let log = SourceLog {
        inner: Arc::new(SourceCounters {
            data_notifications: AtomicUsize::new(0),
            resumes: AtomicUsize::new(0),
            pauses: AtomicUsize::new(0),
        }),
    };
    let source = ScriptedSource {
        script: script.into(),
        subscriber: None,
        paused: false,
        burst,
        log: log.clone(),
    };
    (source, log)
}

impl ScriptedSource {
    /// 交付循环：在未暂停期间持续按脚本推进。
    fn run(&mut self) {
        while !self.paused {
            let subscriber = match self.subscriber {
                Some(ref mut subscriber) => subscriber,
                None => return,
            };
            let step = match self.script.pop_front() {
                Some(step) => step,
                None => return,
            };
            match step {
                Step::Data(chunk) => {
                    self.log
                        .inner
                        .data_notifications
                        .fetch_add(1, Ordering::SeqCst);
                    if let Flow::Pause = subscriber.on_data(chunk) {
                        if self.burst > 0 {
                            // 突发模式：假装还没看到暂停信号
                            self.burst -= 1;
                        } else {
                            self.paused = true;
                        }
                    }
                }
                Step::Quiet => return,
                Step::End => {
                    subscriber.on_end();
                    return;
                }
                Step::Error(err) => {
                    subscriber.on_error(err);
                    return;
                }
            }
        }
    }
}

impl PushSource for ScriptedSource {
    fn subscribe(&mut self, subscriber: BoxSubscriber) {
        // 一次性注册：重复订阅被忽略
        if self.subscriber.is_none() {
            self.subscriber = Some(subscriber);
        }
    }

    fn pause(&mut self) {
        self.log.inner.pauses.fetch_add(1, Ordering::SeqCst);
        self.paused = true;
    }

    fn resume(&mut self) {
        self.log.inner.resumes.fetch_add(1, Ordering::SeqCst);
        self.paused = false;
        self.run();
    }
}

// ========== 拉式读取器替身 ==========

/// 读取器脚本的一步：对一次轮询的应答。
pub(crate) enum Read {
    /// 产出一个数据块
    Chunk(Bytes),
    /// 本次轮询悬置（不注册唤醒，由测试手工再轮询）
    Pending,
    /// 流结束
    Eof,
    /// 读取失败
    Error(Error),
}

impl Read {
    /// 以静态文本构造一个数据步骤。
    pub(crate) fn chunk(text: &'static str) -> Read {
        Read::Chunk(Bytes::from_static(text.as_bytes()))
    }
}

/// 按脚本应答的拉式读取器，记录被轮询的次数。
pub(crate) struct ScriptedReader {
    script: VecDeque<Read>,
    log: ReadLog,
}

/// 读取器替身的共享观察窗口。
#[derive(Clone)]
pub(crate) struct ReadLog {
    polls: Arc<AtomicUsize>,
}

impl ReadLog {
    /// 读取器被轮询的总次数。
    pub(crate) fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

/// 创建一个脚本读取器。脚本耗尽后表现为流已结束。
pub(crate) fn reader(script: Vec<Read>) -> (ScriptedReader, ReadLog) {
    let log = ReadLog {
        polls: Arc::new(AtomicUsize::new(0)),
    };
    let reader = ScriptedReader {
        script: script.into(),
        log: log.clone(),
    };
    (reader, log)
}

impl Stream for ScriptedReader {
    type Item = crate::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.log.polls.fetch_add(1, Ordering::SeqCst);
        match this.script.pop_front() {
            Some(Read::Chunk(bytes)) => Poll::Ready(Some(Ok(bytes))),
            Some(Read::Pending) => Poll::Pending,
            Some(Read::Error(err)) => Poll::Ready(Some(Err(err))),
            Some(Read::Eof) | None => Poll::Ready(None),
        }
    }
}

// ========== 观察者替身 ==========

/// 记录到的一次通知。
#[derive(Debug)]
pub(crate) enum Event {
    /// 一个数据块（已解包为原始字节视图）
    Data(Bytes),
    /// 正常结束
    End,
    /// 失败终止
    Error(Error),
}

/// 把每个通知按序记录下来的观察者，以固定的 [`Flow`] 裁决作答。
pub(crate) struct Recorder {
    flow: Flow,
    events: Arc<Mutex<Vec<Event>>>,
}

/// 观察者替身的共享记录。
#[derive(Clone)]
pub(crate) struct Recording {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recording {
    /// 取走目前为止的全部记录。
    pub(crate) fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// 目前为止记录到的数据通知数。
    pub(crate) fn data_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| matches!(event, Event::Data(_)))
            .count()
    }
}

/// 创建一个记录观察者及其共享记录。
pub(crate) fn recorder(flow: Flow) -> (Recorder, Recording) {
    let events = Arc::new(Mutex::new(Vec::new()));
    (
        Recorder {
            flow,
            events: events.clone(),
        },
        Recording { events },
    )
}

impl Subscriber for Recorder {
    fn on_data(&mut self, chunk: Chunk) -> Flow {
        self.events
            .lock()
            .unwrap()
            .push(Event::Data(chunk.into_bytes()));
        self.flow
    }

    fn on_end(&mut self) {
        self.events.lock().unwrap().push(Event::End);
    }

    fn on_error(&mut self, err: Error) {
        self.events.lock().unwrap().push(Event::Error(err));
    }
}

// ========== 失败原因替身 ==========

/// 带文字说明的失败原因，用于断言错误转发的透明性。
#[derive(Debug)]
pub(crate) struct Boom {
    reason: &'static str,
}

impl Boom {
    /// 以给定说明构造一个失败原因。
    pub(crate) fn new(reason: &'static str) -> Boom {
        Boom { reason }
    }

    /// 构造时给定的说明文字。
    pub(crate) fn reason(&self) -> &str {
        self.reason
    }
}

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

impl StdError for Boom {}
