//! 数据集操作.

use std::path::{Path, PathBuf};

pub mod brats;
mod cache;
pub mod datalist;
mod error;
pub mod split;

pub use brats::BratsDataset;
pub use cache::{CacheDataset, CacheOptions};
pub use datalist::{load_datalist, CaseRecord};
pub use error::{DatasetError, DatasetResult};
pub use split::{ParseSectionError, Partition, Section, SplitError, SplitSpec, Splitter};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}
