//! 双向流范式适配器模块——crate 的核心。
//!
//! 网络 I/O 中两种可读流抽象互不兼容：推式（生产者主动发射、消费者以
//! pause/resume 节流）与拉式（消费者逐次发起异步读取）。本模块在两个
//! 方向上跨越这条范式边界，并在跨越时完整保持三件事：
//!
//! - **背压**：慢的消费端通过各自范式的原生机制拖住快的生产端；
//! - **顺序与完整性**：块不丢失、不重复、不乱序；
//! - **终止与错误的一次性传播**：end/error 原样转发、恰好一次。
//!
//! 两个适配器各自独立、无共享可变状态：
//!
//! - [`PullStream`]（推转拉）：消费一个 [`PushSource`]，产出
//!   `futures_core::Stream`。
//! - [`PushStream`] + [`Pump`]（拉转推）：消费一个拉式读取器，产出
//!   实现 [`PushSource`] 的推式流对象，读循环由配对的泵驱动。
//!
//! 推式范式本身的能力契约（[`PushSource`]、[`Subscriber`]、[`Flow`]、
//! [`Chunk`]）定义在 `source` 子模块中并于此处再导出。
//!
//! 持有未知范式来源的调用方先用 [`body::Data`](crate::body::Data) 的
//! 分类谓词判定范式，再走对应方向的适配器；适配结果交给只讲单一范式
//! 的传输层。适配器自身不含任何超时——它们是纯反应式的。

// --- 公开的 re-export ---

/// 推式范式的能力契约：数据块与流控裁决
pub use self::source::{Chunk, Flow};
/// 推式范式的能力契约：源与观察者，以及各自的装箱形态
pub use self::source::{BoxPushSource, BoxSubscriber, PushSource, Subscriber};

/// 推转拉适配器
pub use self::pull::PullStream;
/// 拉转推适配器：消费端句柄与读循环泵
pub use self::push::{Pump, PushStream};

// --- 子模块声明 ---

/// `pull` 子模块：推转拉适配器 `PullStream` 的实现
mod pull;
/// `push` 子模块：拉转推适配器 `PushStream`/`Pump` 的实现
mod push;
/// `source` 子模块：推式可读流的能力契约
mod source;

/// 装箱的拉式可读流，归一化层承载"未知具体类型的拉式流"时的统一形态。
///
/// 每次 `poll_next` 即一次 pull；`Ready(None)` 即"已完成"。
pub type BoxPullStream =
    std::pin::Pin<Box<dyn futures_core::Stream<Item = crate::Result<bytes::Bytes>> + Send>>;

/// 编译期静态断言函数，确保适配器类型可以跨任务移动。
///
/// 通过在泛型函数中要求 `T: Send` 约束，利用编译器在编译期验证；
/// 该函数永远不会被调用，仅用于触发编译期检查。
fn _assert_send() {
    fn _assert<T: Send>() {}

    _assert::<PullStream<BoxPushSource>>();
    _assert::<PushStream>();
    _assert::<Pump<BoxPullStream>>();
    _assert::<BoxPullStream>();
}

// ========== 往返转换测试 ==========
