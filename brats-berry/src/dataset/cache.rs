//! 缓存数据集.
//!
//! 构建时立即对前 `min(cache_num, floor(len * cache_rate))` 个病例执行变换并缓存结果,
//! 其余病例在访问时才读取和变换.

use super::datalist::CaseRecord;
use super::error::{DatasetError, DatasetResult};
use crate::transform::{Item, Transform};
use std::borrow::Cow;
use std::sync::Arc;

/// 缓存参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheOptions {
    /// 最多缓存的条目数.
    pub cache_num: usize,

    /// 缓存条目占总数的比例, `[0, 1]`.
    pub cache_rate: f64,

    /// 构建缓存的工作线程数. 0 表示在当前线程中依次构建.
    pub num_workers: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_num: usize::MAX,
            cache_rate: 1.0,
            num_workers: 0,
        }
    }
}

impl CacheOptions {
    /// 对 `len` 个条目, 求实际缓存的条目数.
    pub fn cache_len(&self, len: usize) -> DatasetResult<usize> {
        if !(0.0..=1.0).contains(&self.cache_rate) {
            return Err(DatasetError::InvalidCacheRate(self.cache_rate));
        }
        let by_rate = (len as f64 * self.cache_rate).floor() as usize;
        Ok(self.cache_num.min(by_rate))
    }
}

/// 对病例记录执行变换.
#[inline]
fn load_item(index: usize, record: &CaseRecord, t: &dyn Transform) -> DatasetResult<Item> {
    t.apply(record.to_item())
        .map_err(|e| DatasetError::Transform(index, e))
}

/// 带缓存的数据集.
pub struct CacheDataset {
    records: Vec<CaseRecord>,
    transform: Arc<dyn Transform>,
    cache: Vec<Item>,
}

impl CacheDataset {
    /// 构建数据集并立即填充缓存. 任一缓存条目变换失败都会使构建失败.
    pub fn new(
        records: Vec<CaseRecord>,
        transform: Arc<dyn Transform>,
        opts: CacheOptions,
    ) -> DatasetResult<Self> {
        let cache_len = opts.cache_len(records.len())?;
        log::debug!(
            "Caching {cache_len} of {} items with {} workers",
            records.len(),
            opts.num_workers
        );
        let cache = fill_cache(&records[..cache_len], transform.as_ref(), opts.num_workers)?;
        Ok(Self {
            records,
            transform,
            cache,
        })
    }

    /// 条目总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 已缓存的条目数.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// 病例记录.
    #[inline]
    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// 获取第 `index` 个条目. 已缓存则直接借出, 否则现场读取并变换.
    ///
    /// `index` 越界时 panic.
    pub fn get(&self, index: usize) -> DatasetResult<Cow<'_, Item>> {
        match self.cache.get(index) {
            Some(item) => Ok(Cow::Borrowed(item)),
            None => {
                let record = &self.records[index];
                load_item(index, record, self.transform.as_ref()).map(Cow::Owned)
            }
        }
    }

    /// 按顺序迭代全部条目.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = DatasetResult<Cow<'_, Item>>> {
        (0..self.len()).map(move |i| self.get(i))
    }
}

fn fill_sequential(records: &[CaseRecord], t: &dyn Transform) -> DatasetResult<Vec<Item>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| load_item(i, r, t))
        .collect()
}

#[cfg(feature = "rayon")]
fn fill_cache(
    records: &[CaseRecord],
    t: &dyn Transform,
    num_workers: usize,
) -> DatasetResult<Vec<Item>> {
    use rayon::prelude::*;

    if num_workers == 0 {
        return fill_sequential(records, t);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .thread_name(|i| format!("brats-cache-{i}"))
        .build()
        .map_err(|e| DatasetError::WorkerPool(e.to_string()))?;

    // 结果顺序与记录顺序一致.
    pool.install(|| {
        records
            .par_iter()
            .enumerate()
            .map(|(i, r)| load_item(i, r, t))
            .collect()
    })
}

#[cfg(not(feature = "rayon"))]
fn fill_cache(
    records: &[CaseRecord],
    t: &dyn Transform,
    num_workers: usize,
) -> DatasetResult<Vec<Item>> {
    if num_workers > 0 {
        log::debug!("Feature `rayon` is off, caching on the current thread");
    }
    fill_sequential(records, t)
}

#[cfg(test)]
mod tests {
    use super::{CacheDataset, CacheOptions};
    use crate::dataset::datalist::CaseRecord;
    use crate::dataset::error::DatasetError;
    use crate::transform::{Entry, Item, Transform, TransformError, TransformResult};
    use ndarray::{ArrayD, IxDyn};
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn records(n: usize) -> Vec<CaseRecord> {
        (0..n)
            .map(|i| CaseRecord::candidate(format!("/data/c{i}"), &format!("c{i}")))
            .collect()
    }

    /// 统计调用次数, 并把 label 路径替换为一个标量体数据.
    struct Counting(AtomicUsize);

    impl Transform for Counting {
        fn apply(&self, mut item: Item) -> TransformResult<Item> {
            self.0.fetch_add(1, Ordering::Relaxed);
            item.take("label")?;
            item.insert("label", Entry::Volume(ArrayD::zeros(IxDyn(&[1]))));
            Ok(item)
        }
    }

    fn counting() -> Arc<Counting> {
        Arc::new(Counting(AtomicUsize::new(0)))
    }

    #[test]
    fn test_cache_len() {
        let opts = CacheOptions::default();
        assert_eq!(opts.cache_len(7).unwrap(), 7);

        let opts = CacheOptions {
            cache_rate: 0.5,
            ..Default::default()
        };
        assert_eq!(opts.cache_len(7).unwrap(), 3);

        let opts = CacheOptions {
            cache_num: 2,
            ..Default::default()
        };
        assert_eq!(opts.cache_len(7).unwrap(), 2);

        let opts = CacheOptions {
            cache_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            opts.cache_len(7),
            Err(DatasetError::InvalidCacheRate(_))
        ));
    }

    #[test]
    fn test_partial_cache() {
        let t = counting();
        let opts = CacheOptions {
            cache_rate: 0.5,
            ..Default::default()
        };
        let ds = CacheDataset::new(records(4), t.clone(), opts).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.cached_len(), 2);
        assert_eq!(t.0.load(Ordering::Relaxed), 2);

        assert!(matches!(ds.get(0).unwrap(), Cow::Borrowed(_)));
        assert!(matches!(ds.get(3).unwrap(), Cow::Owned(_)));
        // 缓存命中不再调用变换.
        assert_eq!(t.0.load(Ordering::Relaxed), 3);

        let items: Vec<_> = ds.iter().collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|it| it.volume("label").is_ok()));
    }

    #[test]
    fn test_parallel_cache_keeps_order() {
        let t = |mut item: Item| -> TransformResult<Item> {
            let Some(Entry::Path(p)) = item.get("label").cloned() else {
                return Err(TransformError::MissingKey("label".into()));
            };
            item.insert("id", Entry::Path(p.parent().unwrap().to_owned()));
            Ok(item)
        };
        let opts = CacheOptions {
            num_workers: num_cpus::get().clamp(2, 4),
            ..Default::default()
        };
        let recs = records(16);
        let ds = CacheDataset::new(recs.clone(), Arc::new(t), opts).unwrap();
        assert_eq!(ds.cached_len(), 16);
        for (i, r) in recs.iter().enumerate() {
            let item = ds.get(i).unwrap();
            assert_eq!(item.get("id"), Some(&Entry::Path(format!("/data/c{i}").into())));
            assert_eq!(item.get("label"), Some(&Entry::Path(r.label().to_owned())));
        }
    }

    #[test]
    fn test_cache_failure_reports_index() {
        let fail_on_second = |item: Item| -> TransformResult<Item> {
            match item.get("label") {
                Some(Entry::Path(p)) if p.starts_with("/data/c1") => {
                    Err(TransformError::MissingKey("boom".into()))
                }
                _ => Ok(item),
            }
        };
        let err = CacheDataset::new(records(3), Arc::new(fail_on_second), CacheOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, DatasetError::Transform(1, _)));

        // 不缓存时, 错误推迟到访问时.
        let opts = CacheOptions {
            cache_num: 0,
            ..Default::default()
        };
        let ds = CacheDataset::new(records(3), Arc::new(fail_on_second), opts).unwrap();
        assert!(ds.get(0).is_ok());
        assert!(matches!(ds.get(1), Err(DatasetError::Transform(1, _))));
    }
}
