//! BraTS 病例文件发现.
//!
//! 数据集根目录的每个直接子目录即为一个病例, 子目录名即病例 ID:
//!
//! ```text
//! root/
//! └── BraTS20_Training_001/
//!     ├── BraTS20_Training_001_flair.nii
//!     ├── BraTS20_Training_001_t1.nii
//!     ├── BraTS20_Training_001_t1ce.nii
//!     ├── BraTS20_Training_001_t2.nii
//!     └── BraTS20_Training_001_seg.nii
//! ```

use crate::consts::{Modality, IMAGE_KEY, LABEL_KEY, MODALITY_LEN, SEG_SUFFIX};
use crate::transform::{Entry, Item};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 单个病例的文件记录.
///
/// 只有当 4 个模态文件和分割文件在发现时全部存在, 记录才会被创建.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseRecord {
    id: String,
    image: [PathBuf; MODALITY_LEN],
    label: PathBuf,
}

impl CaseRecord {
    /// 根据病例目录 `case_dir` 和病例 ID 构造候选记录. 不检查文件是否存在.
    ///
    /// 文件名直接由 `id` 的原始字节拼接, `id` 不要求是合法 UTF-8.
    pub fn candidate<P: AsRef<Path>, S: AsRef<OsStr>>(case_dir: P, id: S) -> Self {
        let case_dir = case_dir.as_ref();
        let id = id.as_ref();
        let file = |suffix: &str| {
            let mut name = OsString::from(id);
            name.push(format!("_{suffix}.nii"));
            case_dir.join(name)
        };
        Self {
            id: id.to_string_lossy().into_owned(),
            image: Modality::ALL.map(|m| file(m.suffix())),
            label: file(SEG_SUFFIX),
        }
    }

    /// 病例 ID, 即病例目录名. 非 UTF-8 字符被替换为 `U+FFFD`.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 按 flair, t1, t1ce, t2 顺序排列的模态文件路径.
    #[inline]
    pub fn image(&self) -> &[PathBuf; MODALITY_LEN] {
        &self.image
    }

    /// 指定模态的文件路径.
    #[inline]
    pub fn modality(&self, m: Modality) -> &Path {
        &self.image[m as usize]
    }

    /// 分割标注文件路径.
    #[inline]
    pub fn label(&self) -> &Path {
        &self.label
    }

    /// 记录涉及的全部 5 个文件路径.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.image
            .iter()
            .map(PathBuf::as_path)
            .chain(std::iter::once(self.label.as_path()))
    }

    /// 全部文件是否都存在?
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.paths().all(Path::exists)
    }

    /// 转换为 `{ "image": [4 paths], "label": path }` 形式的条目.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(IMAGE_KEY, Entry::Paths(self.image.to_vec()));
        item.insert(LABEL_KEY, Entry::Path(self.label.clone()));
        item
    }
}

/// 扫描 `root_dir`, 为每个完整的病例目录生成一条 [`CaseRecord`].
///
/// 结果按目录遍历顺序排列, 该顺序依赖平台和文件系统, 不保证有序.
///
/// # 注意
///
/// 1. 缺少任一文件的病例会被直接跳过, 不视为错误.
/// 2. `root_dir` 下的非目录项被忽略.
/// 3. 只检查文件是否存在, 不读取文件内容.
/// 4. `root_dir` 无法遍历时返回 `Err`.
pub fn load_datalist<P: AsRef<Path>>(root_dir: P) -> io::Result<Vec<CaseRecord>> {
    let mut ans = Vec::new();
    for entry in fs::read_dir(root_dir.as_ref())? {
        let case_dir = entry?.path();
        if !case_dir.is_dir() {
            continue;
        }
        let Some(id) = case_dir.file_name() else {
            continue;
        };

        let record = CaseRecord::candidate(&case_dir, id);
        if record.is_complete() {
            ans.push(record);
        } else {
            log::debug!("Skip incomplete case `{}`", record.id());
        }
    }
    Ok(ans)
}
