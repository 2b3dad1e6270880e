//! 通用常量.

/// 分割标签编码.
pub mod label {
    /// 原 BraTS 数据集中, 背景的体素值.
    pub const BRATS_BACKGROUND: u8 = 0;

    /// 原 BraTS 数据集中, 坏死及非增强肿瘤核心 (NCR/NET) 的体素值.
    pub const BRATS_NECROTIC: u8 = 1;

    /// 原 BraTS 数据集中, 瘤周水肿 (ED) 的体素值.
    pub const BRATS_EDEMA: u8 = 2;

    /// 原 BraTS 数据集中, GD 增强肿瘤 (ET) 的体素值.
    ///
    /// 注意不是 3. 数据集中不存在 3.
    pub const BRATS_ENHANCING: u8 = 4;

    /// 体素是否属于肿瘤核心 (TC)?
    #[inline]
    pub const fn is_tumor_core(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC | BRATS_ENHANCING)
    }

    /// 体素是否属于全肿瘤 (WT)?
    #[inline]
    pub const fn is_whole_tumor(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC | BRATS_EDEMA | BRATS_ENHANCING)
    }

    /// 体素是否属于增强肿瘤 (ET)?
    #[inline]
    pub const fn is_enhancing_tumor(p: u8) -> bool {
        matches!(p, BRATS_ENHANCING)
    }

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BRATS_BACKGROUND)
    }
}

/// 每个病例的 MRI 模态数.
pub const MODALITY_LEN: usize = 4;

/// 多通道标签的通道数 (TC, WT, ET).
pub const MASK_CHANNEL_LEN: usize = 3;

/// 默认验证集比例.
pub const DEFAULT_VAL_FRAC: f64 = 0.19;

/// 默认测试集比例.
pub const DEFAULT_TEST_FRAC: f64 = 0.01;

/// 默认随机种子.
pub const DEFAULT_SEED: u64 = 0;

/// 条目字典中, 多模态图像的默认键.
pub const IMAGE_KEY: &str = "image";

/// 条目字典中, 分割标签的默认键.
pub const LABEL_KEY: &str = "label";

/// MRI 模态. 声明顺序即病例记录中图像路径的固定顺序.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Modality {
    /// T2 液体衰减反转恢复序列.
    Flair,

    /// T1 加权.
    T1,

    /// T1 加权对比增强.
    T1ce,

    /// T2 加权.
    T2,
}

impl Modality {
    /// 按固定顺序排列的全部模态.
    pub const ALL: [Modality; MODALITY_LEN] = [Self::Flair, Self::T1, Self::T1ce, Self::T2];

    /// 文件名后缀, 即 `{case}_{suffix}.nii` 中的 `suffix`.
    #[inline]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Flair => "flair",
            Self::T1 => "t1",
            Self::T1ce => "t1ce",
            Self::T2 => "t2",
        }
    }
}

/// 分割标签文件名后缀.
pub const SEG_SUFFIX: &str = "seg";

/// 多通道标签中的肿瘤区域. 声明顺序即通道顺序.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Region {
    /// 肿瘤核心, 标签 1 和 4.
    TumorCore,

    /// 全肿瘤, 标签 1, 2 和 4.
    WholeTumor,

    /// 增强肿瘤, 标签 4.
    EnhancingTumor,
}

impl Region {
    /// 按通道顺序排列的全部区域.
    pub const ALL: [Region; MASK_CHANNEL_LEN] =
        [Self::TumorCore, Self::WholeTumor, Self::EnhancingTumor];

    /// 所在通道下标.
    #[inline]
    pub const fn channel(&self) -> usize {
        *self as usize
    }

    /// 体素标签 `p` 是否属于该区域.
    #[inline]
    pub const fn contains(&self, p: u8) -> bool {
        match self {
            Self::TumorCore => label::is_tumor_core(p),
            Self::WholeTumor => label::is_whole_tumor(p),
            Self::EnhancingTumor => label::is_enhancing_tumor(p),
        }
    }

    /// 简称.
    #[inline]
    pub const fn abbr(&self) -> &'static str {
        match self {
            Self::TumorCore => "TC",
            Self::WholeTumor => "WT",
            Self::EnhancingTumor => "ET",
        }
    }
}
