//! 可复现的训练/验证/测试集划分.
//!
//! 划分方式: 用种子初始化随机数生成器, 对 `[0, N)` 做一次均匀洗牌得到排列 `P`, 然后
//!
//! - 测试集: `P[0 .. test_len]`
//! - 验证集: `P[test_len .. test_len + val_len]`
//! - 训练集: `P[test_len + val_len ..]`
//!
//! 其中 `test_len = floor(N * test_frac)`, `val_len = floor(N * val_frac)`.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// 数据集分区.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Section {
    /// 训练集.
    Training,

    /// 验证集.
    Validation,

    /// 测试集.
    Test,
}

impl Section {
    /// 全部分区.
    pub const ALL: [Section; 3] = [Self::Training, Self::Validation, Self::Test];

    /// 分区名.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 无法识别的分区名.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSectionError(pub String);

impl fmt::Display for ParseSectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown section `{}`, expected training, validation or test",
            self.0
        )
    }
}

impl std::error::Error for ParseSectionError {}

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "training" => Ok(Self::Training),
            "validation" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(ParseSectionError(other.to_owned())),
        }
    }
}

/// 划分参数错误.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitError {
    /// 比例不是 `[0, 1]` 内的有限数. 参数为 (参数名, 取值).
    InvalidFraction(&'static str, f64),
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFraction(name, v) => {
                write!(f, "`{name}` must be a fraction in [0, 1], got {v}")
            }
        }
    }
}

impl std::error::Error for SplitError {}

/// 划分比例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitSpec {
    val_frac: f64,
    test_frac: f64,
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self {
            val_frac: crate::consts::DEFAULT_VAL_FRAC,
            test_frac: crate::consts::DEFAULT_TEST_FRAC,
        }
    }
}

impl SplitSpec {
    /// 构建划分比例.
    ///
    /// 两个比例都必须在 `[0, 1]` 内, 否则返回 `Err`. 两者之和可以不小于 1,
    /// 此时训练集为空.
    pub fn new(val_frac: f64, test_frac: f64) -> Result<Self, SplitError> {
        check_fraction("val_frac", val_frac)?;
        check_fraction("test_frac", test_frac)?;
        Ok(Self {
            val_frac,
            test_frac,
        })
    }

    /// 验证集比例.
    #[inline]
    pub fn val_frac(&self) -> f64 {
        self.val_frac
    }

    /// 测试集比例.
    #[inline]
    pub fn test_frac(&self) -> f64 {
        self.test_frac
    }

    /// 对 `len` 个样本, 求 `(test_len, val_len)`.
    #[inline]
    pub fn lens(&self, len: usize) -> (usize, usize) {
        (floor_frac(len, self.test_frac), floor_frac(len, self.val_frac))
    }
}

#[inline]
fn check_fraction(name: &'static str, v: f64) -> Result<(), SplitError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(SplitError::InvalidFraction(name, v))
    }
}

/// `floor(len * frac)`, 以 `f64` 计算.
#[inline]
fn floor_frac(len: usize, frac: f64) -> usize {
    (len as f64 * frac).floor() as usize
}

/// 划分器. 持有自己的随机数生成器, 不与其他实例共享随机状态.
#[derive(Clone, Debug)]
pub struct Splitter {
    rng: ChaCha8Rng,
    spec: SplitSpec,
}

impl Splitter {
    /// 以 `seed` 初始化随机数生成器.
    pub fn new(seed: u64, spec: SplitSpec) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), spec)
    }

    /// 使用外部构造好的随机数生成器.
    #[inline]
    pub fn with_rng(rng: ChaCha8Rng, spec: SplitSpec) -> Self {
        Self { rng, spec }
    }

    /// 划分比例.
    #[inline]
    pub fn spec(&self) -> SplitSpec {
        self.spec
    }

    /// 对 `len` 个样本做一次划分. 会推进内部随机状态.
    pub fn split(&mut self, len: usize) -> Partition {
        let mut permutation: Vec<usize> = (0..len).collect();
        permutation.shuffle(&mut self.rng);
        let (test_len, val_len) = self.spec.lens(len);
        Partition {
            permutation,
            test_len,
            val_len,
        }
    }

    /// 归还随机数生成器.
    #[inline]
    pub fn into_rng(self) -> ChaCha8Rng {
        self.rng
    }
}

/// 一次划分的结果: 排列 `P` 和各分区长度.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    permutation: Vec<usize>,
    test_len: usize,
    val_len: usize,
}

impl Partition {
    /// 用全新的、以 `seed` 初始化的划分器对 `len` 个样本做划分.
    ///
    /// 相同的 `(len, seed, spec)` 总是得到相同的结果.
    #[inline]
    pub fn from_seed(len: usize, seed: u64, spec: SplitSpec) -> Self {
        Splitter::new(seed, spec).split(len)
    }

    /// 样本总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// 是否没有样本.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// 洗牌后的完整排列.
    #[inline]
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// 分区 `section` 在排列中的下标范围. 边界被截断到样本总数.
    pub fn range(&self, section: Section) -> Range<usize> {
        let n = self.len();
        let test_end = self.test_len.min(n);
        let val_end = self.test_len.saturating_add(self.val_len).min(n);
        match section {
            Section::Test => 0..test_end,
            Section::Validation => test_end..val_end,
            Section::Training => val_end..n,
        }
    }

    /// 分区 `section` 选中的样本在原列表中的绝对下标, 按排列顺序.
    #[inline]
    pub fn indices(&self, section: Section) -> &[usize] {
        &self.permutation[self.range(section)]
    }

    /// 分区 `section` 的样本个数.
    #[inline]
    pub fn section_len(&self, section: Section) -> usize {
        self.range(section).len()
    }

    /// 按排列顺序取出 `items` 中属于 `section` 的元素.
    ///
    /// `items` 的长度必须等于 `self.len()`, 否则程序 panic.
    pub fn select<T: Clone>(&self, section: Section, items: &[T]) -> Vec<T> {
        assert_eq!(items.len(), self.len(), "划分长度与数据长度不一致");
        self.indices(section)
            .iter()
            .map(|&i| items[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Partition, Section, SplitError, SplitSpec, Splitter};
    use std::collections::HashSet;

    fn spec(val: f64, test: f64) -> SplitSpec {
        SplitSpec::new(val, test).unwrap()
    }

    #[test]
    fn test_sizes_and_disjointness() {
        for n in [0usize, 1, 2, 7, 100, 369] {
            for (val, test) in [(0.19, 0.01), (0.2, 0.1), (0.5, 0.25), (0.0, 0.0)] {
                let p = Partition::from_seed(n, 42, spec(val, test));
                let test_len = (n as f64 * test).floor() as usize;
                let val_len = (n as f64 * val).floor() as usize;

                assert_eq!(p.section_len(Section::Test), test_len);
                assert_eq!(p.section_len(Section::Validation), val_len);
                assert_eq!(p.section_len(Section::Training), n - test_len - val_len);

                let mut seen = HashSet::new();
                for s in Section::ALL {
                    for &i in p.indices(s) {
                        assert!(i < n);
                        assert!(seen.insert(i), "index {i} appears twice");
                    }
                }
                assert_eq!(seen.len(), n);
            }
        }
    }

    #[test]
    fn test_default_fractions() {
        let p = Partition::from_seed(100, 0, SplitSpec::default());
        assert_eq!(p.section_len(Section::Test), 1);
        assert_eq!(p.section_len(Section::Validation), 19);
        assert_eq!(p.section_len(Section::Training), 80);
    }

    #[test]
    fn test_deterministic() {
        let a = Partition::from_seed(50, 7, SplitSpec::default());
        let b = Partition::from_seed(50, 7, SplitSpec::default());
        assert_eq!(a, b);
        for s in Section::ALL {
            assert_eq!(a.indices(s), b.indices(s));
        }
    }

    #[test]
    fn test_different_seeds() {
        let a = Partition::from_seed(50, 0, SplitSpec::default());
        let b = Partition::from_seed(50, 1, SplitSpec::default());
        assert_ne!(a.permutation(), b.permutation());
    }

    #[test]
    fn test_splitter_owns_its_state() {
        let mut s = Splitter::new(3, SplitSpec::default());
        let first = s.split(20);
        let second = s.split(20);
        // 同一个划分器连续划分会推进随机状态.
        assert_ne!(first, second);
        // 但新的划分器总能复现第一次的结果.
        assert_eq!(first, Partition::from_seed(20, 3, SplitSpec::default()));
    }

    #[test]
    fn test_no_holdout() {
        let items: Vec<u32> = (100..130).collect();
        let p = Partition::from_seed(items.len(), 5, spec(0.0, 0.0));
        assert!(p.indices(Section::Test).is_empty());
        assert!(p.indices(Section::Validation).is_empty());
        assert_eq!(p.indices(Section::Training), p.permutation());

        let train = p.select(Section::Training, &items);
        let expected: Vec<u32> = p.permutation().iter().map(|&i| items[i]).collect();
        assert_eq!(train, expected);
    }

    #[test]
    fn test_overfull_holdout() {
        let p = Partition::from_seed(10, 0, spec(0.7, 0.6));
        assert_eq!(p.section_len(Section::Test), 6);
        assert_eq!(p.section_len(Section::Validation), 4);
        assert!(p.indices(Section::Training).is_empty());

        let p = Partition::from_seed(10, 0, spec(1.0, 1.0));
        assert_eq!(p.section_len(Section::Test), 10);
        assert_eq!(p.section_len(Section::Validation), 0);
        assert_eq!(p.section_len(Section::Training), 0);
    }

    #[test]
    fn test_section_order() {
        let p = Partition::from_seed(10, 9, spec(0.3, 0.2));
        let perm = p.permutation();
        assert_eq!(p.indices(Section::Test), &perm[..2]);
        assert_eq!(p.indices(Section::Validation), &perm[2..5]);
        assert_eq!(p.indices(Section::Training), &perm[5..]);
    }

    #[test]
    fn test_invalid_fraction() {
        assert_eq!(
            SplitSpec::new(-0.1, 0.0).unwrap_err(),
            SplitError::InvalidFraction("val_frac", -0.1)
        );
        assert!(SplitSpec::new(0.1, f64::NAN).is_err());
        assert!(SplitSpec::new(0.1, 1.5).is_err());
    }

    #[test]
    fn test_section_from_str() {
        for s in Section::ALL {
            assert_eq!(s.name().parse::<Section>().unwrap(), s);
        }
        assert!("train".parse::<Section>().is_err());
    }
}
