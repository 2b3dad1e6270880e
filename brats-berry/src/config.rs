//! 数据集与训练配置.
//!
//! 所有配置都有默认值. 打开 `serde` feature 后可以从任意 serde 格式读取,
//! 缺省的字段取默认值.

use crate::consts::{DEFAULT_SEED, DEFAULT_TEST_FRAC, DEFAULT_VAL_FRAC};
use crate::dataset::{CacheOptions, SplitError, SplitSpec};

/// 数据集配置: 划分参数和缓存参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DatasetConfig {
    /// 验证集比例.
    pub val_frac: f64,

    /// 测试集比例.
    pub test_frac: f64,

    /// 划分用的随机种子.
    pub seed: u64,

    /// 缓存参数. 对划分和变换没有影响.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub cache: CacheOptions,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            val_frac: DEFAULT_VAL_FRAC,
            test_frac: DEFAULT_TEST_FRAC,
            seed: DEFAULT_SEED,
            cache: CacheOptions::default(),
        }
    }
}

impl DatasetConfig {
    /// 检查并获取划分比例.
    #[inline]
    pub fn split_spec(&self) -> Result<SplitSpec, SplitError> {
        SplitSpec::new(self.val_frac, self.test_frac)
    }
}

/// UNETR 网络结构参数.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnetrConfig {
    /// 输入块形状.
    pub img_shape: (usize, usize, usize),

    /// 输入通道数, 即模态数.
    pub input_dim: usize,

    /// 输出通道数, 即多通道标签的通道数.
    pub output_dim: usize,

    /// patch 边长.
    pub patch_size: usize,

    /// 嵌入维数.
    pub embed_dim: usize,

    /// transformer 层数.
    pub num_layers: usize,

    /// 注意力头数.
    pub num_heads: usize,

    /// MLP 隐层维数.
    pub mlp_dim: usize,

    /// 提供跳连特征的 transformer 层, 从 1 开始计.
    pub extract_layers: Vec<usize>,
}

impl Default for UnetrConfig {
    fn default() -> Self {
        Self {
            img_shape: (96, 96, 96),
            input_dim: crate::consts::MODALITY_LEN,
            output_dim: crate::consts::MASK_CHANNEL_LEN,
            patch_size: 16,
            embed_dim: 768,
            num_layers: 12,
            num_heads: 12,
            mlp_dim: 2048,
            extract_layers: vec![3, 6, 9, 12],
        }
    }
}

impl UnetrConfig {
    /// 每个输入块被切成的 patch 数.
    pub fn num_patches(&self) -> usize {
        let (a, b, c) = self.img_shape;
        (a / self.patch_size) * (b / self.patch_size) * (c / self.patch_size)
    }
}

/// 训练超参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainConfig {
    /// 训练轮数.
    pub epoch: usize,

    /// 学习率.
    pub learning_rate: f64,

    /// 权重衰减.
    pub weight_decay: f64,

    /// 验证指标不再提升多少轮后提前停止.
    pub patience: usize,

    /// 网络结构.
    pub unetr: UnetrConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epoch: 200,
            learning_rate: 1e-4,
            weight_decay: 1e-5,
            patience: 50,
            unetr: UnetrConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetConfig, TrainConfig};
    use crate::consts::Modality;

    #[test]
    fn test_dataset_defaults() {
        let c = DatasetConfig::default();
        assert_eq!((c.val_frac, c.test_frac, c.seed), (0.19, 0.01, 0));
        assert_eq!(c.cache.num_workers, 0);
        assert!(c.split_spec().is_ok());

        let bad = DatasetConfig {
            test_frac: -1.0,
            ..c
        };
        assert!(bad.split_spec().is_err());
    }

    #[test]
    fn test_unetr_matches_data_layout() {
        let t = TrainConfig::default();
        assert_eq!(t.unetr.input_dim, Modality::ALL.len());
        assert_eq!(t.unetr.output_dim, 3);
        assert_eq!(t.unetr.num_patches(), 216);
        assert_eq!(t.unetr.embed_dim % t.unetr.num_heads, 0);
        assert!(t.unetr.extract_layers.iter().all(|l| *l <= t.unetr.num_layers));
    }
}
