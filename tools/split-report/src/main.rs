//! 扫描 BraTS 数据集, 输出训练/验证/测试集划分情况.

mod result;
mod runner;

use clap::Parser;
use std::path::PathBuf;

/// 命令行参数.
#[derive(Parser, Debug)]
#[command(version, about = "Report the train/val/test split of a BraTS dataset")]
pub struct Args {
    /// 数据集根目录. 缺省时使用 `$BRATS_DIR` 或 `$HOME/dataset/brats`.
    pub root: Option<PathBuf>,

    /// 划分用的随机种子.
    #[arg(long, default_value_t = brats_berry::consts::DEFAULT_SEED)]
    pub seed: u64,

    /// 验证集比例.
    #[arg(long, default_value_t = brats_berry::consts::DEFAULT_VAL_FRAC)]
    pub val_frac: f64,

    /// 测试集比例.
    #[arg(long, default_value_t = brats_berry::consts::DEFAULT_TEST_FRAC)]
    pub test_frac: f64,

    /// 将数据分布柱状图保存到该路径.
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// 读取所有病例并统计肿瘤区域体素数.
    #[arg(long)]
    pub check: bool,

    /// `--check` 时构建缓存的线程数. 缺省为可用核心数.
    #[arg(long)]
    pub workers: Option<usize>,

    /// 打印每个分区的病例 ID.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    let report = runner::run(&args)?;
    report.analyze(args.verbose)?;

    if let Some(path) = args.plot.as_ref() {
        let [train, val, test] = report.section_lens();
        brats_berry::plot::save_distribution_chart(path, train, val, test)?;
        log::info!("Saved data distribution to {}", path.display());
    }
    Ok(())
}
