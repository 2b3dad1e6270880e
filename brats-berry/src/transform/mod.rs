//! 条目变换.
//!
//! 一个条目 ([`Item`]) 是以字符串为键的字典, 数据集中的每个病例对应一个条目.
//! 变换 ([`Transform`]) 接收一个条目, 返回新的条目. 变换必须是无状态的纯函数,
//! 以便缓存数据集在多个工作线程中并发调用.

use ndarray::{Array3, ArrayD};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

mod load;
mod mask;

pub use load::{LoadLabel, LoadModalities};
pub use mask::{multi_channel_mask, ConvertToMultiChannel};

use crate::consts::{IMAGE_KEY, LABEL_KEY};
use crate::data::VolumeError;

/// 条目中的单个值.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// 单个文件路径.
    Path(PathBuf),

    /// 有序的文件路径列表.
    Paths(Vec<PathBuf>),

    /// 3D 整数分割标签, `[z, H, W]`.
    Label(Array3<u8>),

    /// 任意维 `f32` 数据, 如多模态扫描 `[C, z, H, W]` 或多通道标签.
    Volume(ArrayD<f32>),
}

impl Entry {
    /// 值的种类名, 用于错误信息.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Paths(_) => "paths",
            Self::Label(_) => "label",
            Self::Volume(_) => "volume",
        }
    }
}

/// 数据条目. 以字符串为键.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    entries: BTreeMap<String, Entry>,
}

impl Item {
    /// 空条目.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换 `key` 对应的值, 返回旧值.
    #[inline]
    pub fn insert<K: Into<String>>(&mut self, key: K, entry: Entry) -> Option<Entry> {
        self.entries.insert(key.into(), entry)
    }

    /// 获取 `key` 对应的值.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// 移出 `key` 对应的值.
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    /// 移出 `key` 对应的值. 不存在时返回 [`TransformError::MissingKey`].
    #[inline]
    pub fn take(&mut self, key: &str) -> TransformResult<Entry> {
        self.remove(key)
            .ok_or_else(|| TransformError::MissingKey(key.to_owned()))
    }

    /// 是否包含 `key`.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 键值对个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按键的字典序迭代键值对.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 获取 `key` 对应的 `f32` 数据.
    pub fn volume(&self, key: &str) -> TransformResult<&ArrayD<f32>> {
        match self.get(key) {
            Some(Entry::Volume(v)) => Ok(v),
            Some(other) => Err(TransformError::unexpected(key, "volume", other)),
            None => Err(TransformError::MissingKey(key.to_owned())),
        }
    }

    /// 获取 `key` 对应的整数标签.
    pub fn label(&self, key: &str) -> TransformResult<&Array3<u8>> {
        match self.get(key) {
            Some(Entry::Label(v)) => Ok(v),
            Some(other) => Err(TransformError::unexpected(key, "label", other)),
            None => Err(TransformError::MissingKey(key.to_owned())),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Entry)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, Entry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// 变换运行时错误.
#[derive(Debug)]
pub enum TransformError {
    /// 条目缺少指定键.
    MissingKey(String),

    /// 键对应的值种类不符合预期.
    UnexpectedEntry {
        /// 键.
        key: String,
        /// 期望的种类.
        expected: &'static str,
        /// 实际的种类.
        found: &'static str,
    },

    /// 读取体数据失败.
    Volume(VolumeError),

    /// 数组形状错误.
    Shape(ndarray::ShapeError),

    /// 同一条目中的多个体数据形状不一致. 参数为键.
    ShapeMismatch(String),
}

impl TransformError {
    #[inline]
    pub(crate) fn unexpected(key: &str, expected: &'static str, found: &Entry) -> Self {
        Self::UnexpectedEntry {
            key: key.to_owned(),
            expected,
            found: found.kind(),
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(k) => write!(f, "item has no key `{k}`"),
            Self::UnexpectedEntry {
                key,
                expected,
                found,
            } => write!(f, "key `{key}`: expected {expected}, found {found}"),
            Self::Volume(e) => write!(f, "{e}"),
            Self::Shape(e) => write!(f, "{e}"),
            Self::ShapeMismatch(k) => write!(f, "key `{k}`: volumes differ in shape"),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Volume(e) => Some(e),
            Self::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VolumeError> for TransformError {
    fn from(e: VolumeError) -> Self {
        Self::Volume(e)
    }
}

impl From<ndarray::ShapeError> for TransformError {
    fn from(e: ndarray::ShapeError) -> Self {
        Self::Shape(e)
    }
}

/// 变换结果.
pub type TransformResult<T> = Result<T, TransformError>;

/// 条目变换.
///
/// 实现必须是无状态的, 同一条目多次变换应得到相同结果.
pub trait Transform: Send + Sync {
    /// 变换一个条目.
    fn apply(&self, item: Item) -> TransformResult<Item>;
}

impl<F> Transform for F
where
    F: Fn(Item) -> TransformResult<Item> + Send + Sync,
{
    #[inline]
    fn apply(&self, item: Item) -> TransformResult<Item> {
        self(item)
    }
}

/// 原样返回条目.
#[derive(Copy, Clone, Debug, Default)]
pub struct Identity;

impl Transform for Identity {
    #[inline]
    fn apply(&self, item: Item) -> TransformResult<Item> {
        Ok(item)
    }
}

/// 依次执行一串变换. 遇到第一个错误即停止.
#[derive(Default)]
pub struct Compose {
    steps: Vec<Box<dyn Transform>>,
}

impl Compose {
    /// 空变换链, 等价于 [`Identity`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 在链尾追加变换.
    #[inline]
    #[must_use]
    pub fn then<T: Transform + 'static>(mut self, t: T) -> Self {
        self.steps.push(Box::new(t));
        self
    }

    /// 变换个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// 是否为空链.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transform for Compose {
    fn apply(&self, item: Item) -> TransformResult<Item> {
        self.steps.iter().try_fold(item, |item, t| t.apply(item))
    }
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compose")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// BraTS 常用的预处理链: 读取四个模态, 读取分割标签, 转换为多通道标签.
pub fn brats_pipeline() -> Compose {
    Compose::new()
        .then(LoadModalities::new([IMAGE_KEY]))
        .then(LoadLabel::new([LABEL_KEY]))
        .then(ConvertToMultiChannel::new([LABEL_KEY]))
}
