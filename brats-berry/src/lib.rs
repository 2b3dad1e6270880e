#![warn(missing_docs)]

//! 核心库. 提供 BraTS 格式脑肿瘤 MRI 数据集的病例发现, 可复现划分, 标签变换与缓存.
//!
//! # 注意
//!
//! 1. 数据集必须按 BraTS 模式组织: 根目录下每个子目录是一个病例,
//!   包含 `{id}_{flair,t1,t1ce,t2,seg}.nii` 五个文件.
//! 2. 缺少任一文件的病例会被跳过, 不会报错 (打开 `debug` 日志可以看到被跳过的病例).
//! 3. 划分只依赖病例个数和随机种子. 但病例列表按目录遍历顺序排列,
//!   因此在不同文件系统上, 同一个种子可能选中不同的病例.
//!
//! # 开发计划
//!
//! ### 病例发现与划分 ✅
//!
//! 实现位于 `brats-berry/src/dataset/{datalist, split}.rs`.
//!
//! ### 多通道标签 (TC / WT / ET) ✅
//!
//! 实现位于 `brats-berry/src/transform/mask.rs`.
//!
//! ### 缓存数据集 ✅
//!
//! 支持 `rayon` 线程池并行构建缓存.
//!
//! 实现位于 `brats-berry/src/dataset/cache.rs`.
//!
//! ### 数据分布可视化 ✅
//!
//! 需要 `plot` feature.
//!
//! ### 随机数据增强 ⌛️
//!
//! 缓存目前保存完整变换后的条目, 随机变换需要在缓存之后单独执行.

/// 三维索引, `(z, H, W)`.
pub type Idx3d = (usize, usize, usize);

pub mod config;
pub mod consts;

/// 3D MRI nii 文件基础数据结构.
mod data;

pub use data::{MriVolume, NiftiHeaderAttr, SegVolume, VolumeError, VolumeResult};

pub mod dataset;

#[cfg(feature = "plot")]
pub mod plot;

pub mod prelude;
pub mod transform;
