use std::fmt;
use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayViewD, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::Region;
use crate::Idx3d;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 打开 nii 体数据时的错误.
#[derive(Debug)]
pub enum VolumeError {
    /// nifti 文件读取或解码错误.
    Nifti(nifti::NiftiError),

    /// 数据不是三维的. 参数为实际维数.
    NotVolume(usize),

    /// 数据形状错误.
    Shape(ndarray::ShapeError),
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nifti(e) => write!(f, "nifti error: {e}"),
            Self::NotVolume(ndim) => write!(f, "expected a 3D volume, found {ndim} dimensions"),
            Self::Shape(e) => write!(f, "volume shape error: {e}"),
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Nifti(e) => Some(e),
            Self::NotVolume(_) => None,
            Self::Shape(e) => Some(e),
        }
    }
}

impl From<nifti::NiftiError> for VolumeError {
    fn from(e: nifti::NiftiError) -> Self {
        Self::Nifti(e)
    }
}

impl From<ndarray::ShapeError> for VolumeError {
    fn from(e: ndarray::ShapeError) -> Self {
        Self::Shape(e)
    }
}

/// 打开体数据的结果.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// 将 nifti 的 `[W, H, z]` 数据转换为标准布局的 `[z, H, W]`. 以后均按照该模式访问.
fn into_zhw<T: Clone>(data: ndarray::ArrayD<T>) -> VolumeResult<Array3<T>> {
    if data.ndim() != 3 {
        return Err(VolumeError::NotVolume(data.ndim()));
    }
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = data.into_dimensionality::<Ix3>()?.reversed_axes();
    let data = if data.is_standard_layout() {
        data
    } else {
        data.as_standard_layout().into_owned()
    };
    debug_assert!(data.is_standard_layout());
    Ok(data)
}

/// 一个体素间距为 1mm 的空 header.
fn unit_header() -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.pixdim[1..4].fill(1.0);
    header
}

/// 3D MRI nii 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表 z, 高, 宽方向.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [z, h, w] = self.pix_dim();
        z == h && z == w
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }
}

/// nii 格式 3D MRI 单模态扫描, 包括 header 和强度值. 强度以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct MriVolume {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl NiftiHeaderAttr for MriVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for MriVolume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl MriVolume {
    /// 打开 nii 文件格式的 3D MRI 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> VolumeResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = into_zhw(obj.into_volume().into_ndarray::<f32>()?)?;
        Ok(Self { header, data })
    }

    /// 由 `[z, H, W]` 格式的裸数据直接创建扫描, 体素间距视为 1mm.
    pub fn from_array(data: Array3<f32>) -> Self {
        Self {
            header: unit_header(),
            data,
        }
    }

    /// 数据形状 `(z, H, W)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_data(self) -> Array3<f32> {
        self.data
    }
}

/// nii 格式 3D MRI 分割标注, 包括 header 和真值标签. 标签值以 `u8` 保存.
#[derive(Debug, Clone)]
pub struct SegVolume {
    header: BoxedHeader,
    data: Array3<u8>,
}

impl NiftiHeaderAttr for SegVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for SegVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl SegVolume {
    /// 打开 nii 文件格式的 3D 分割标注. `path` 为 nii 文件的本地路径.
    ///
    /// 不论文件以何种数值类型存储, 标签均被转换为 `u8`.
    pub fn open<P: AsRef<Path>>(path: P) -> VolumeResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = into_zhw(obj.into_volume().into_ndarray::<u8>()?)?;
        Ok(Self { header, data })
    }

    /// 由 `[z, H, W]` 格式的裸标签直接创建标注, 体素间距视为 1mm.
    ///
    /// 标签值应为 0, 1, 2 或 4. 其他值不属于任何肿瘤区域.
    pub fn from_array(data: Array3<u8>) -> Self {
        Self {
            header: unit_header(),
            data,
        }
    }

    /// 数据形状 `(z, H, W)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_data(self) -> Array3<u8> {
        self.data
    }

    /// 获取 3D 标注中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取属于肿瘤区域 `region` 的体素个数.
    pub fn region_voxels(&self, region: Region) -> usize {
        self.data.iter().filter(|p| region.contains(**p)).count()
    }

    /// 获取肿瘤区域 `region` 的实际体积, 以毫升为单位.
    #[inline]
    pub fn region_volume_ml(&self, region: Region) -> f64 {
        self.region_voxels(region) as f64 * self.voxel() / 1000.0
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl SegVolume {
    /// 借助 `rayon`, 并行地获取属于肿瘤区域 `region` 的体素个数.
    pub fn par_region_voxels(&self, region: Region) -> usize {
        use ndarray::parallel::prelude::*;

        self.data.par_iter().filter(|p| region.contains(**p)).count()
    }
}

/// 获取任意维数据的一份三维视图. 若维数不为 3, 返回 `Err`.
#[inline]
pub(crate) fn view3<T>(data: ArrayViewD<'_, T>) -> VolumeResult<ArrayView<'_, T, Ix3>> {
    let ndim = data.ndim();
    data.into_dimensionality::<Ix3>()
        .map_err(|_| VolumeError::NotVolume(ndim))
}
