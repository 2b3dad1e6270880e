//! 对 `brats-berry::dataset` 的更一层封装. 提供更直接的数据集加载器.

use brats_berry::config::DatasetConfig;
use brats_berry::dataset::{BratsDataset, DatasetResult, Section};
use brats_berry::transform::Transform;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 数据集根目录环境变量.
pub const BRATS_DIR_VAR: &str = "BRATS_DIR";

/// 获取 BraTS 数据集根目录.
///
/// 1. 若环境变量 `$BRATS_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/brats`. 无法确定主目录时返回 `None`.
pub fn brats_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var_os(BRATS_DIR_VAR) {
        Some(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => brats_berry::dataset::home_dataset_dir_with(["brats"]),
    }
}

/// 获取 BraTS 数据集的 `section` 分区. 各分区可共享同一个变换.
pub fn dataset<P: AsRef<Path>>(
    path: P,
    section: Section,
    transform: Arc<dyn Transform>,
    config: &DatasetConfig,
) -> DatasetResult<BratsDataset> {
    BratsDataset::with_shared_transform(path, section, transform, config)
}
