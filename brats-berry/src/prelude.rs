//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::config::{DatasetConfig, TrainConfig};
pub use crate::consts::label::{BRATS_BACKGROUND, BRATS_EDEMA, BRATS_ENHANCING, BRATS_NECROTIC};
pub use crate::consts::{Modality, Region, IMAGE_KEY, LABEL_KEY};
pub use crate::data::{MriVolume, NiftiHeaderAttr, SegVolume};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{
    self, load_datalist, BratsDataset, CaseRecord, Partition, Section, SplitSpec, Splitter,
};

pub use crate::transform::{
    brats_pipeline, multi_channel_mask, Compose, ConvertToMultiChannel, Entry, Item, Transform,
};

#[cfg(feature = "plot")]
pub use crate::plot::{distribution_chart, save_distribution_chart};
