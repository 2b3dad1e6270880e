//! 数据集构建错误.

use super::split::SplitError;
use crate::transform::TransformError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// 构建或读取数据集时的错误.
#[derive(Debug)]
pub enum DatasetError {
    /// 数据集根目录不存在或不是目录.
    DirNotFound(PathBuf),

    /// 遍历数据集目录时的底层 I/O 错误.
    Io(io::Error),

    /// 划分参数错误.
    Split(SplitError),

    /// `cache_rate` 不在 `[0, 1]` 内.
    InvalidCacheRate(f64),

    /// 对条目 (以其在本数据集中的下标标识) 执行变换失败.
    Transform(usize, TransformError),

    /// 无法创建缓存工作线程池.
    WorkerPool(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirNotFound(p) => write!(f, "Cannot find dataset directory: {}.", p.display()),
            Self::Io(e) => write!(f, "dataset I/O error: {e}"),
            Self::Split(e) => write!(f, "{e}"),
            Self::InvalidCacheRate(r) => write!(f, "`cache_rate` must be in [0, 1], got {r}"),
            Self::Transform(i, e) => write!(f, "transform failed on item {i}: {e}"),
            Self::WorkerPool(e) => write!(f, "cannot build cache worker pool: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Split(e) => Some(e),
            Self::Transform(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DatasetError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SplitError> for DatasetError {
    fn from(e: SplitError) -> Self {
        Self::Split(e)
    }
}

/// 数据集操作结果.
pub type DatasetResult<T> = Result<T, DatasetError>;
