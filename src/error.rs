//! 错误与结果类型模块
//!
//! 本模块定义了 crate 的核心错误类型 [`Error`]。适配器层对失败路径是
//! 透明的：上游源的失败被原样携带、一次性地转发给下游消费者，不重试、
//! 不吞掉、也不做二次包装——`Error` 只负责给失败分类并保留原因链。
//!
//! ## 设计理念
//!
//! - **不透明错误**：`Error` 使用 `Box<ErrorImpl>` 包装内部实现，既减小了
//!   栈上的大小（仅一个指针宽度），又隐藏了内部结构细节。
//! - **错误链**：通过 `std::error::Error::source()` 支持错误链；
//!   从 `source()` 向下转型得到的具体类型不属于稳定 API。

// 引入标准库的 Error trait，重命名为 StdError 以避免与本 crate 的 Error 类型冲突
use std::error::Error as StdError;
use std::fmt;

/// 本 crate 方法常用的 Result 类型别名。
pub type Result<T> = std::result::Result<T, Error>;

/// 错误原因的类型别名。
///
/// 使用 `Box<dyn StdError + Send + Sync>` 作为类型擦除的错误原因，
/// 允许存储任意实现了 `Error + Send + Sync` 的错误类型。
/// `Send + Sync` 约束确保错误可以安全地跨任务传递。
pub type Cause = Box<dyn StdError + Send + Sync>;

/// 表示在范式适配或输入归一化过程中发生的错误。
///
/// # 格式化
///
/// 此类型的 `Display` 实现只会打印当前层级的错误详情，即使它可能由另一个
/// 错误引起、且包含该错误作为 source。要打印完整的错误链，请使用
/// `std::error::Report` 或等效的第三方类型。
///
/// # Source
///
/// 上游源的失败通过 [`Error::new_source`] 构造，原因可经 `Error::source()`
/// 以类型擦除的方式取回。适配器在转发时保持 `Error` 值本身的同一性，
/// 不会在每一跳上再包一层。
pub struct Error {
    // 使用 Box 进行堆分配，使 Error 的栈大小仅为一个指针宽度。
    // 这对于 Result<T, Error> 的大小优化非常重要。
    inner: Box<ErrorImpl>,
}

/// 错误的内部实现结构体。
///
/// 包含错误的分类（kind）和可选的原因链（cause）。
struct ErrorImpl {
    /// 错误的分类，决定了此错误属于哪种类型
    kind: Kind,
    /// 可选的底层错误原因，用于构建错误链
    cause: Option<Cause>,
}

/// 错误分类枚举。
///
/// 这是 crate 内部使用的错误分类体系，通过 `pub(super)` 可见性限制在
/// crate 内使用。
#[derive(Debug)]
pub(super) enum Kind {
    /// 上游源的失败：推式源发出的 error 通知，或拉式源一次被拒绝的读取。
    /// 原因原样保留，终止性地转发给下游。
    Source,
    /// 归一化层收到了既非文本、亦非二进制、也不是可识别流形态的输入，
    /// 或目标形态不接受流式输入（如 WebSocket 帧载荷）。
    UnsupportedData,
}

/// `Error` 类型的主要方法实现。
///
/// 包括公共的 `is_*` 查询方法（用于判断错误类别）和
/// `new_*` 系列构造方法。
impl Error {
    /// 创建一个新的 `Error`，仅指定错误类别，不带原因。
    ///
    /// 这是所有 `new_*` 构造方法的基础。使用 `Box::new` 将 `ErrorImpl`
    /// 分配到堆上，使得 `Error` 本身只占一个指针的大小。
    fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    /// 为已有的 `Error` 附加一个错误原因。
    ///
    /// 采用 builder 模式，返回 `self` 以支持链式调用：
    /// `Error::new(kind).with(cause)`
    fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    /// 由上游源的失败构造一个错误。
    ///
    /// 原因原样保留，可经 `Error::source()` 取回——适配器的失败信号
    /// 携带的就是这个原因本身，不做任何改写。
    ///
    /// 推式源的实现者在其 error 通知路径上使用此构造器，
    /// 再经 [`Subscriber::on_error`](crate::bridge::Subscriber::on_error) 转发。
    pub fn new_source<C: Into<Cause>>(cause: C) -> Error {
        Error::new(Kind::Source).with(cause)
    }

    /// 创建一个"不支持的数据输入"错误。
    pub(super) fn new_unsupported_data() -> Error {
        Error::new(Kind::UnsupportedData)
    }

    /// 如果此错误来自上游源的失败，返回 `true`。
    pub fn is_source(&self) -> bool {
        matches!(self.inner.kind, Kind::Source)
    }

    /// 如果此错误是归一化层的"不支持的数据输入"错误，返回 `true`。
    pub fn is_unsupported_data(&self) -> bool {
        matches!(self.inner.kind, Kind::UnsupportedData)
    }

    /// 在错误的 source 链中查找特定类型的错误。
    ///
    /// 遍历整个错误链（通过 `source()` 方法），尝试将每个错误
    /// 向下转型（downcast）为目标类型 `E`。
    pub(crate) fn find_source<E: StdError + 'static>(&self) -> Option<&E> {
        let mut cause = self.source();
        while let Some(err) = cause {
            if let Some(typed) = err.downcast_ref() {
                return Some(typed);
            }
            cause = err.source();
        }

        // else
        None
    }

    /// 返回当前层级错误的文字描述（不含 source 链）。
    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Source => "error from upstream source",
            Kind::UnsupportedData => "unsupported data input",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("stream_bridge::Error");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

/// 为 `Error` 实现 `Display` trait。
///
/// 仅显示当前层级的错误描述，不包含 source 链。
/// 这是有意为之的设计：让调用者决定是否以及如何展示完整的错误链。
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            // 将 &Box<dyn StdError + Send + Sync> 转换为 &(dyn StdError + 'static)
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl StdError for Boom {}

    /// 辅助函数：断言类型 T 实现了 Send + Sync + 'static。
    /// 利用 Rust 的 trait bound 在编译时检查，如果不满足则编译失败。
    fn assert_send_sync<T: Send + Sync + 'static>() {}

    /// 测试 `Error` 类型满足 `Send + Sync` 约束。
    /// 适配器跨任务转发失败信号，错误必须能安全地跨线程传递。
    #[test]
    fn error_satisfies_send_sync() {
        assert_send_sync::<Error>()
    }

    /// 防止意外增大 Error 的内存占用。
    #[test]
    fn error_size_of() {
        assert_eq!(mem::size_of::<Error>(), mem::size_of::<usize>());
    }

    /// 原因必须按同一性保留：从 source 链中能向下转型回原始类型。
    #[test]
    fn source_cause_is_preserved() {
        let err = Error::new_source(Boom);
        assert!(err.is_source());
        assert!(!err.is_unsupported_data());
        assert!(err.find_source::<Boom>().is_some());
    }

    #[test]
    fn unsupported_data_has_no_cause() {
        let err = Error::new_unsupported_data();
        assert!(err.is_unsupported_data());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "unsupported data input");
    }
}
