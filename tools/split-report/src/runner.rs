//! 程序运行函数.

use crate::result::{RegionStats, SectionReport, SplitReport};
use crate::Args;
use anyhow::Context;
use brats_berry::config::DatasetConfig;
use brats_berry::consts::Region;
use brats_berry::dataset::{self, CacheOptions, Partition, Section, SplitSpec};
use brats_berry::transform::brats_pipeline;
use ndarray::Axis;
use std::path::PathBuf;
use std::sync::Arc;
use utils::loader;

/// 实际运行.
pub fn run(args: &Args) -> anyhow::Result<SplitReport> {
    let root = match args.root.clone() {
        Some(p) => p,
        None => loader::brats_dir_from_env_or_home().context("Cannot locate dataset directory")?,
    };
    anyhow::ensure!(
        root.is_dir(),
        "Cannot find dataset directory: {}.",
        root.display()
    );

    let spec = SplitSpec::new(args.val_frac, args.test_frac)?;
    let datalist = dataset::load_datalist(&root)
        .with_context(|| format!("Listing {}", root.display()))?;
    let partition = Partition::from_seed(datalist.len(), args.seed, spec);

    let sections = Section::ALL.map(|s| SectionReport {
        section: s,
        ids: partition
            .select(s, &datalist)
            .iter()
            .map(|r| r.id().to_owned())
            .collect(),
        regions: None,
    });
    let mut report = SplitReport {
        root,
        seed: args.seed,
        total: datalist.len(),
        sections,
    };

    if args.check {
        check(args, &mut report)?;
    }
    Ok(report)
}

/// 逐个读取病例, 统计各分区肿瘤区域的体素数.
fn check(args: &Args, report: &mut SplitReport) -> anyhow::Result<()> {
    let config = DatasetConfig {
        val_frac: args.val_frac,
        test_frac: args.test_frac,
        seed: args.seed,
        cache: CacheOptions {
            // 借助缓存线程池并行读取.
            num_workers: args.workers.unwrap_or_else(utils::cpus),
            ..Default::default()
        },
    };
    let pipeline = Arc::new(brats_pipeline());
    let root: PathBuf = report.root.clone();

    for sr in report.sections.iter_mut() {
        let ds = loader::dataset(&root, sr.section, pipeline.clone(), &config)?;
        let mut stats = RegionStats::default();
        for (k, item) in ds.iter().enumerate() {
            let item = item?;
            let mask = item.volume(brats_berry::consts::LABEL_KEY)?;
            for region in Region::ALL {
                let voxels = mask
                    .index_axis(Axis(0), region.channel())
                    .iter()
                    .filter(|v| **v > 0.5)
                    .count();
                stats.voxels[region.channel()] += voxels;
            }
            log::debug!("Checked {}", ds.records()[k].id());
        }
        stats.cases = ds.len();
        sr.regions = Some(stats);
    }
    Ok(())
}
