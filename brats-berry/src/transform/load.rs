//! 从磁盘读取 nii 文件的变换.

use super::{Entry, Item, Transform, TransformError, TransformResult};
use crate::data::{MriVolume, SegVolume};
use ndarray::{Array3, Axis};
use std::path::PathBuf;

/// 将指定键下的模态文件路径列表读取为 `[C, z, H, W]` 的 `f32` 数据.
///
/// 各模态的形状必须一致, 否则返回 [`TransformError::ShapeMismatch`].
/// 单个路径视为只有一个通道.
#[derive(Clone, Debug)]
pub struct LoadModalities {
    keys: Vec<String>,
}

impl LoadModalities {
    /// 对 `keys` 中的每个键进行读取.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn load(key: &str, paths: Vec<PathBuf>) -> TransformResult<Entry> {
        let volumes = paths
            .iter()
            .map(|p| MriVolume::open(p).map(MriVolume::into_data))
            .collect::<Result<Vec<Array3<f32>>, _>>()?;
        if volumes.windows(2).any(|w| w[0].dim() != w[1].dim()) {
            return Err(TransformError::ShapeMismatch(key.to_owned()));
        }

        let views: Vec<_> = volumes.iter().map(Array3::view).collect();
        let stacked = ndarray::stack(Axis(0), &views)?;
        Ok(Entry::Volume(stacked.into_dyn()))
    }
}

impl Transform for LoadModalities {
    fn apply(&self, mut item: Item) -> TransformResult<Item> {
        for key in self.keys.iter() {
            let paths = match item.take(key)? {
                Entry::Paths(v) => v,
                Entry::Path(p) => vec![p],
                other => return Err(TransformError::unexpected(key, "paths", &other)),
            };
            item.insert(key.as_str(), Self::load(key, paths)?);
        }
        Ok(item)
    }
}

/// 将指定键下的分割文件路径读取为 `[z, H, W]` 的 `u8` 标签.
#[derive(Clone, Debug)]
pub struct LoadLabel {
    keys: Vec<String>,
}

impl LoadLabel {
    /// 对 `keys` 中的每个键进行读取.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Transform for LoadLabel {
    fn apply(&self, mut item: Item) -> TransformResult<Item> {
        for key in self.keys.iter() {
            let path = match item.take(key)? {
                Entry::Path(p) => p,
                other => return Err(TransformError::unexpected(key, "path", &other)),
            };
            let label = SegVolume::open(&path)?.into_data();
            item.insert(key.as_str(), Entry::Label(label));
        }
        Ok(item)
    }
}
