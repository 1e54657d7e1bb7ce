//! 异构数据输入（`Data`）模块。
//!
//! 发送端拿到的"数据"形态五花八门：文本、单段二进制、缓冲数组、
//! 推式流、拉式流。[`Data`] 把它们收拢为一个封闭的和类型——范式分类
//! 在 `From` 转换/构造函数这一刻由类型系统完成，此后的分类谓词
//! （[`Data::is_push_readable`] 等）只是对已定形态的能力查询，
//! 不再做任何结构嗅探。
//!
//! 本模块还提供两个按目标形态归一化的出口：
//!
//! - [`prepare_frame`]：归一化为单个完整的字节序列（WebSocket 帧载荷）。
//!   流式输入在此形态下不受支持，同步拒绝。
//! - [`Data::into_pull`]：任一范式的可读流归一化为拉式流；
//!   非流输入同步拒绝。
//!
//! HTTP 请求体方向的归一化（接受全部形态）见
//! [`prepare_body`](super::prepare_body)。

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use futures_core::Stream;

use crate::bridge::{BoxPullStream, BoxPushSource, PullStream, PushSource};
use crate::common::buf::BufList;
use crate::Error;

/// 发送端可接受的异构数据输入。
///
/// 五种形态覆盖了文本、二进制与两种流范式；`From` 转换负责把常见的
/// 具体类型装入对应形态。流形态经 [`Data::push`]/[`Data::pull`] 构造，
/// 构造即完成范式分类。
pub enum Data {
    /// 文本，发送前按 UTF-8 编码为字节
    Text(String),
    /// 单段二进制缓冲
    Binary(Bytes),
    /// 缓冲数组：多段不连续的二进制块，归一化时拼接
    Chunks(Vec<Bytes>),
    /// 推式可读流
    Push(BoxPushSource),
    /// 拉式可读流
    Pull(BoxPullStream),
}

impl Data {
    /// 以推式源构造流形态的输入。
    pub fn push<S>(source: S) -> Data
    where
        S: PushSource + Send + 'static,
    {
        Data::Push(Box::new(source))
    }

    /// 以拉式读取器构造流形态的输入。
    pub fn pull<R>(reader: R) -> Data
    where
        R: Stream<Item = crate::Result<Bytes>> + Send + 'static,
    {
        Data::Pull(Box::pin(reader))
    }

    /// 此输入是否为推式可读流。
    pub fn is_push_readable(&self) -> bool {
        matches!(self, Data::Push(_))
    }

    /// 此输入是否为拉式可读流。
    pub fn is_pull_readable(&self) -> bool {
        matches!(self, Data::Pull(_))
    }

    /// 此输入是否为任一范式的可读流。
    pub fn is_readable(&self) -> bool {
        self.is_push_readable() || self.is_pull_readable()
    }

    /// 把任一范式的可读流归一化为拉式流。
    ///
    /// 拉式流原样通过；推式流经推转拉适配器
    /// （[`PullStream`]）包装。非流输入以"不支持的数据输入"
    /// 错误同步拒绝。
    pub fn into_pull(self) -> crate::Result<BoxPullStream> {
        match self {
            Data::Push(source) => Ok(Box::pin(PullStream::new(source))),
            Data::Pull(stream) => Ok(stream),
            Data::Text(_) | Data::Binary(_) | Data::Chunks(_) => {
                Err(Error::new_unsupported_data())
            }
        }
    }
}

impl From<String> for Data {
    fn from(text: String) -> Data {
        Data::Text(text)
    }
}

impl From<&str> for Data {
    fn from(text: &str) -> Data {
        Data::Text(text.to_owned())
    }
}

impl From<Bytes> for Data {
    fn from(bytes: Bytes) -> Data {
        Data::Binary(bytes)
    }
}

impl From<BytesMut> for Data {
    fn from(bytes: BytesMut) -> Data {
        Data::Binary(bytes.freeze())
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Data {
        Data::Binary(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Data {
    fn from(bytes: &'static [u8]) -> Data {
        Data::Binary(Bytes::from_static(bytes))
    }
}

impl From<Vec<Bytes>> for Data {
    fn from(chunks: Vec<Bytes>) -> Data {
        Data::Chunks(chunks)
    }
}

/// 为 `Data` 实现 `Debug` trait。
///
/// 流形态不暴露内部结构，仅以占位符标注范式。
impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct Push;
        #[derive(Debug)]
        struct Pull;

        let mut builder = f.debug_tuple("Data");
        match self {
            Data::Text(text) => builder.field(text),
            Data::Binary(bytes) => builder.field(bytes),
            Data::Chunks(chunks) => builder.field(chunks),
            Data::Push(_) => builder.field(&Push),
            Data::Pull(_) => builder.field(&Pull),
        };

        builder.finish()
    }
}

/// 把输入归一化为单个完整的字节序列（WebSocket 帧载荷形态）。
///
/// 文本按 UTF-8 编码；单段二进制零拷贝通过；缓冲数组按序拼接
/// （只有一段时同样零拷贝）。帧载荷必须是有界的完整序列，
/// 任一范式的流式输入都以"不支持的数据输入"错误同步拒绝。
pub fn prepare_frame<D>(data: D) -> crate::Result<Bytes>
where
    D: Into<Data>,
{
    match data.into() {
        Data::Text(text) => Ok(Bytes::from(text)),
        Data::Binary(bytes) => Ok(bytes),
        Data::Chunks(chunks) => Ok(concat(chunks)),
        Data::Push(_) | Data::Pull(_) => Err(Error::new_unsupported_data()),
    }
}

/// 把缓冲数组拼接为单个字节序列。
///
/// 空块被过滤掉；只剩一段时直接零拷贝取出，多段时才分配一次聚合。
pub(super) fn concat(chunks: Vec<Bytes>) -> Bytes {
    let mut list = BufList::new();
    for chunk in chunks {
        if chunk.has_remaining() {
            list.push(chunk);
        }
    }
    let len = list.remaining();
    if len == 0 {
        return Bytes::new();
    }
    list.copy_to_bytes(len)
}

// ========== 测试模块 ==========
