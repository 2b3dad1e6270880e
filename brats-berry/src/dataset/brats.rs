//! BraTS 训练/验证/测试数据集.

use super::cache::CacheDataset;
use super::datalist::{load_datalist, CaseRecord};
use super::error::{DatasetError, DatasetResult};
use super::split::{Section, Splitter};
use crate::config::DatasetConfig;
use crate::transform::{Item, Transform};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// BraTS 数据集的一个分区.
///
/// 构建时扫描根目录, 按 `seed` 划分, 选出 `section` 对应的病例,
/// 然后交给 [`CacheDataset`] 负责读取, 变换和缓存.
pub struct BratsDataset {
    section: Section,
    indices: Vec<usize>,
    inner: CacheDataset,
}

impl BratsDataset {
    /// 构建数据集.
    ///
    /// # 错误
    ///
    /// 1. `root_dir` 不存在或不是目录时返回 [`DatasetError::DirNotFound`].
    /// 2. 划分比例或缓存比例不合法时返回 `Err`.
    /// 3. 缓存条目变换失败时返回 [`DatasetError::Transform`].
    pub fn new<P, T>(
        root_dir: P,
        section: Section,
        transform: T,
        config: &DatasetConfig,
    ) -> DatasetResult<Self>
    where
        P: AsRef<Path>,
        T: Transform + 'static,
    {
        Self::with_shared_transform(root_dir, section, Arc::new(transform), config)
    }

    /// 同 [`BratsDataset::new`], 但多个分区可以共享同一个变换.
    pub fn with_shared_transform<P: AsRef<Path>>(
        root_dir: P,
        section: Section,
        transform: Arc<dyn Transform>,
        config: &DatasetConfig,
    ) -> DatasetResult<Self> {
        let root_dir = root_dir.as_ref();
        if !root_dir.is_dir() {
            return Err(DatasetError::DirNotFound(root_dir.to_owned()));
        }
        let spec = config.split_spec()?;

        let datalist = load_datalist(root_dir)?;
        let partition = Splitter::new(config.seed, spec).split(datalist.len());
        let indices = partition.indices(section).to_vec();
        let records = partition.select(section, &datalist);
        log::info!(
            "BraTS {section} set: {} of {} cases under {}",
            records.len(),
            datalist.len(),
            root_dir.display()
        );

        let inner = CacheDataset::new(records, transform, config.cache)?;
        Ok(Self {
            section,
            indices,
            inner,
        })
    }

    /// 所属分区.
    #[inline]
    pub fn section(&self) -> Section {
        self.section
    }

    /// 本数据集的病例在完整病例列表中的绝对下标, 按排列顺序.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 本数据集的病例记录, 顺序与 [`BratsDataset::indices`] 一致.
    #[inline]
    pub fn records(&self) -> &[CaseRecord] {
        self.inner.records()
    }

    /// 病例个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// 已缓存的病例个数.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.inner.cached_len()
    }

    /// 获取第 `index` 个变换后的条目.
    ///
    /// `index` 越界时 panic.
    #[inline]
    pub fn get(&self, index: usize) -> DatasetResult<Cow<'_, Item>> {
        self.inner.get(index)
    }

    /// 按顺序迭代全部变换后的条目.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = DatasetResult<Cow<'_, Item>>> {
        self.inner.iter()
    }
}
