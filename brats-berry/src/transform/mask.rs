//! 分割标签到多通道标签的转换.
//!
//! 原标签: 1 为坏死及非增强肿瘤核心, 2 为瘤周水肿, 4 为 GD 增强肿瘤.
//! 转换后的三个通道依次为 TC (1, 4), WT (1, 2, 4), ET (4).

use super::{Entry, Item, Transform, TransformError, TransformResult};
use crate::consts::{Region, MASK_CHANNEL_LEN};
use crate::data;
use ndarray::{Array4, ArrayView3, Axis, Zip};

/// 将分割标签转换为 `[3, z, H, W]` 的 `f32` 多通道标签, 取值只有 0.0 和 1.0.
pub fn multi_channel_mask(label: ArrayView3<'_, u8>) -> Array4<f32> {
    let (z, h, w) = label.dim();
    let mut ans = Array4::<f32>::zeros((MASK_CHANNEL_LEN, z, h, w));
    for (region, mut channel) in Region::ALL.into_iter().zip(ans.axis_iter_mut(Axis(0))) {
        Zip::from(&mut channel).and(&label).for_each(|m, &p| {
            if region.contains(p) {
                *m = 1.0;
            }
        });
    }
    ans
}

/// 以 `f32` 存储的标签. 只有恰好等于标签编码的值才算作该标签.
fn float_label_code(v: f32) -> u8 {
    match v {
        v if v == 1.0 => 1,
        v if v == 2.0 => 2,
        v if v == 4.0 => 4,
        _ => 0,
    }
}

/// 将条目中指定键的分割标签转换为多通道标签. 其他键原样保留.
///
/// 接受 [`Entry::Label`], 以及三维的 [`Entry::Volume`] (例如以浮点数存储的标签文件).
#[derive(Clone, Debug)]
pub struct ConvertToMultiChannel {
    keys: Vec<String>,
}

impl ConvertToMultiChannel {
    /// 对 `keys` 中的每个键进行转换.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// 需要转换的键.
    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Transform for ConvertToMultiChannel {
    fn apply(&self, mut item: Item) -> TransformResult<Item> {
        for key in self.keys.iter() {
            let mask = match item.take(key)? {
                Entry::Label(label) => multi_channel_mask(label.view()),
                Entry::Volume(v) => {
                    let v = data::view3(v.view())?;
                    multi_channel_mask(v.mapv(float_label_code).view())
                }
                other => return Err(TransformError::unexpected(key, "label", &other)),
            };
            item.insert(key.as_str(), Entry::Volume(mask.into_dyn()));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::{multi_channel_mask, ConvertToMultiChannel};
    use crate::transform::{Entry, Item, Transform, TransformError};
    use ndarray::{Array3, ArrayD, IxDyn};
    use std::path::PathBuf;

    /// 只有 `(1, 2, 3)` 处为 `code` 的标签.
    fn single_voxel(code: u8) -> Array3<u8> {
        let mut a = Array3::zeros((3, 4, 5));
        a[(1, 2, 3)] = code;
        a
    }

    /// `(1, 2, 3)` 处三个通道的取值.
    fn channels_at(code: u8) -> [f32; 3] {
        let m = multi_channel_mask(single_voxel(code).view());
        [m[(0, 1, 2, 3)], m[(1, 1, 2, 3)], m[(2, 1, 2, 3)]]
    }

    #[test]
    fn test_background_only() {
        let m = multi_channel_mask(Array3::<u8>::zeros((2, 3, 4)).view());
        assert_eq!(m.dim(), (3, 2, 3, 4));
        assert!(m.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_label_codes() {
        assert_eq!(channels_at(4), [1.0, 1.0, 1.0]);
        assert_eq!(channels_at(1), [1.0, 1.0, 0.0]);
        assert_eq!(channels_at(2), [0.0, 1.0, 0.0]);
        assert_eq!(channels_at(0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_only_the_labelled_voxel_is_set() {
        let m = multi_channel_mask(single_voxel(4).view());
        assert_eq!(m.iter().filter(|v| **v == 1.0).count(), 3);
        assert!(m.iter().all(|v| *v == 0.0 || *v == 1.0));
    }

    #[test]
    fn test_transform_keeps_other_keys() {
        let mut item = Item::new();
        item.insert("label", Entry::Label(single_voxel(1)));
        item.insert("image", Entry::Paths(vec![PathBuf::from("x.nii")]));
        let before = item.get("image").cloned();

        let out = ConvertToMultiChannel::new(["label"]).apply(item).unwrap();
        assert_eq!(out.get("image").cloned(), before);

        let mask = out.volume("label").unwrap();
        assert_eq!(mask.shape(), &[3, 3, 4, 5]);
        assert_eq!(mask[[0, 1, 2, 3]], 1.0);
        assert_eq!(mask[[2, 1, 2, 3]], 0.0);
    }

    #[test]
    fn test_float_label_volume() {
        let mut v = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2]));
        v[[0, 0, 0]] = 4.0;
        v[[1, 1, 1]] = 2.0;
        v[[0, 1, 0]] = 2.5;
        let item: Item = [("seg", Entry::Volume(v))].into_iter().collect();

        let out = ConvertToMultiChannel::new(["seg"]).apply(item).unwrap();
        let m = out.volume("seg").unwrap();
        assert_eq!(m.shape(), &[3, 2, 2, 2]);
        assert_eq!(m[[2, 0, 0, 0]], 1.0);
        assert_eq!(m[[0, 1, 1, 1]], 0.0);
        assert_eq!(m[[1, 1, 1, 1]], 1.0);
        assert_eq!(m[[1, 0, 1, 0]], 0.0);
    }

    #[test]
    fn test_malformed_input() {
        let t = ConvertToMultiChannel::new(["label"]);

        let err = t.apply(Item::new()).unwrap_err();
        assert!(matches!(err, TransformError::MissingKey(_)));

        let item: Item = [("label", Entry::Path(PathBuf::from("seg.nii")))]
            .into_iter()
            .collect();
        let err = t.apply(item).unwrap_err();
        assert!(matches!(err, TransformError::UnexpectedEntry { found: "path", .. }));

        let item: Item = [("label", Entry::Volume(ArrayD::zeros(IxDyn(&[2, 2]))))]
            .into_iter()
            .collect();
        let err = t.apply(item).unwrap_err();
        assert!(matches!(err, TransformError::Volume(_)));
    }
}
