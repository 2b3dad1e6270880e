//! 划分结果.

use brats_berry::consts::Region;
use brats_berry::dataset::Section;
use itertools::Itertools;
use std::io::{self, Write};
use std::path::PathBuf;

/// 单个分区内肿瘤区域的统计信息.
#[derive(Clone, Debug, Default)]
pub struct RegionStats {
    /// 病例数.
    pub cases: usize,

    /// 各区域体素总数, 按 TC, WT, ET 排列.
    pub voxels: [usize; 3],
}

/// 单个分区的划分结果.
pub struct SectionReport {
    pub section: Section,
    pub ids: Vec<String>,
    pub regions: Option<RegionStats>,
}

/// 将 `sr` 的结果写进 `w` 中.
fn describe_into<W: Write>(
    sr: &SectionReport,
    total: usize,
    verbose: bool,
    w: &mut W,
) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn percent(n: usize, total: usize) -> String {
        match total {
            0 => "/".to_string(),
            t => format!("{:.2}%", n as f64 * 100.0 / t as f64),
        }
    }

    writeln!(w, "Section `{}`:", utils::section_title(sr.section))?;
    writeln!(w, "{S4}Cases: {} ({})", sr.ids.len(), percent(sr.ids.len(), total))?;
    if let Some(stats) = sr.regions.as_ref() {
        for region in Region::ALL {
            let v = stats.voxels[region.channel()];
            let avg = match stats.cases {
                0 => "/".to_string(),
                c => format!("{:.1}", v as f64 / c as f64),
            };
            writeln!(w, "{S4}{} voxels: {v} (average {avg} per case)", region.abbr())?;
        }
    }
    if verbose {
        writeln!(w, "{S4}Ids: [{}]", sr.ids.iter().join(", "))?;
    }
    Ok(())
}

/// 完整划分结果.
pub struct SplitReport {
    pub root: PathBuf,
    pub seed: u64,
    pub total: usize,
    pub sections: [SectionReport; 3],
}

impl SplitReport {
    /// 训练/验证/测试集的病例数.
    pub fn section_lens(&self) -> [usize; 3] {
        [0, 1, 2].map(|k| self.sections[k].ids.len())
    }

    /// 输出划分结果.
    pub fn analyze(&self, verbose: bool) -> io::Result<()> {
        let mut out = io::stdout().lock();
        utils::sep_to(&mut out)?;
        writeln!(
            out,
            "Dataset {} (seed {}): {} complete cases",
            self.root.display(),
            self.seed,
            self.total
        )?;
        utils::sep_to(&mut out)?;

        for sr in self.sections.iter() {
            describe_into(sr, self.total, verbose, &mut out)?;
            utils::sep_to(&mut out)?;
        }
        Ok(())
    }
}
