//! 命令行工具依赖的通用组件.

use brats_berry::dataset::Section;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 分区在报告中的显示名.
#[inline]
pub fn section_title(s: Section) -> &'static str {
    match s {
        Section::Training => "Train",
        Section::Validation => "Val",
        Section::Test => "Test",
    }
}
