//! 数据分布可视化.
//!
//! # 注意
//!
//! 需要 `plot` feature.

use crate::dataset::Section;
use image::{ImageResult, Rgb, RgbImage};
use std::path::Path;

const WIDTH: u32 = 360;
const HEIGHT: u32 = 260;
const LEFT: u32 = 36;
const RIGHT: u32 = 12;
const TOP: u32 = 40;
const BOTTOM: u32 = 32;
const BAR_WIDTH: u32 = 64;

/// 标题与柱顶数字的缩放倍数.
const SCALE: u32 = 3;

/// 坐标轴文字的缩放倍数.
const AXIS_SCALE: u32 = 2;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// 3x5 点阵字形, 每行低 3 位有效, 高位在左. 仅支持数字, 图中用到的大写字母和空格.
const fn glyph(c: char) -> Option<[u8; 5]> {
    let g = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        ' ' => [0; 5],
        _ => return None,
    };
    Some(g)
}

/// 分区对应的柱子颜色: 训练集绿色, 验证集红色, 测试集蓝色.
pub const fn section_color(s: Section) -> Rgb<u8> {
    match s {
        Section::Training => Rgb([0, 128, 0]),
        Section::Validation => Rgb([255, 0, 0]),
        Section::Test => Rgb([0, 0, 255]),
    }
}

/// 分区在横轴上的刻度文字.
const fn tick_label(s: Section) -> &'static str {
    match s {
        Section::Training => "TRAIN",
        Section::Validation => "VAL",
        Section::Test => "TEST",
    }
}

/// 第 `k` 根柱子中心的横坐标.
#[inline]
fn bar_center(k: u32) -> u32 {
    let slot = (WIDTH - LEFT - RIGHT) / 3;
    LEFT + slot * k + slot / 2
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// 文字宽度 (像素).
#[inline]
fn text_width(text: &str, scale: u32) -> u32 {
    (4 * text.chars().count() as u32).saturating_sub(1) * scale
}

/// 以 `(center_x, bottom)` 为底边中点横向绘制 `text`. 不支持的字符留空.
fn draw_text(img: &mut RgbImage, text: &str, center_x: u32, bottom: u32, scale: u32) {
    let x0 = center_x.saturating_sub(text_width(text, scale) / 2);
    let y0 = bottom.saturating_sub(5 * scale);

    for (k, c) in text.chars().enumerate() {
        let Some(g) = glyph(c) else { continue };
        let gx = x0 + 4 * scale * k as u32;
        for (row, bits) in g.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) != 0 {
                    let x = gx + col * scale;
                    let y = y0 + row as u32 * scale;
                    fill_rect(img, x, y, scale, scale, BLACK);
                }
            }
        }
    }
}

/// 逆时针旋转 90° 绘制 `text`, 自下而上阅读. `(left, center_y)` 为文字左边的中点.
fn draw_text_vertical(img: &mut RgbImage, text: &str, left: u32, center_y: u32, scale: u32) {
    let y_base = center_y + text_width(text, scale) / 2;

    for (k, c) in text.chars().enumerate() {
        let Some(g) = glyph(c) else { continue };
        for (row, bits) in g.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) != 0 {
                    let along = 4 * k as u32 + col + 1;
                    let x = left + row as u32 * scale;
                    let y = y_base.saturating_sub(along * scale);
                    fill_rect(img, x, y, scale, scale, BLACK);
                }
            }
        }
    }
}

/// 绘制训练/验证/测试集样本数的柱状图.
///
/// 柱子从左到右依次为训练集 (绿), 验证集 (红), 测试集 (蓝),
/// 高度按最大样本数归一化, 上方标有样本数. 图中另有标题 `DATA DISTRIBUTION`,
/// 横轴刻度 `TRAIN`/`VAL`/`TEST` 和纵轴标签 `NUMBER OF IMAGES`.
pub fn distribution_chart(num_train: usize, num_val: usize, num_test: usize) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
    let base = HEIGHT - BOTTOM;
    // 给数字留出空间.
    let top = TOP + 6 * SCALE;
    let max = num_train.max(num_val).max(num_test);

    draw_text(&mut img, "DATA DISTRIBUTION", WIDTH / 2, TOP - 12, SCALE);

    // 坐标轴.
    fill_rect(&mut img, LEFT, base, WIDTH - LEFT - RIGHT, 1, BLACK);
    fill_rect(&mut img, LEFT, TOP, 1, base - TOP + 1, BLACK);
    draw_text_vertical(&mut img, "NUMBER OF IMAGES", 8, (TOP + base) / 2, AXIS_SCALE);

    let counts = [num_train, num_val, num_test];
    for (k, (section, n)) in Section::ALL.into_iter().zip(counts).enumerate() {
        let center = bar_center(k as u32);
        let h = if max == 0 {
            0
        } else {
            ((base - top) as f64 * n as f64 / max as f64).round() as u32
        };
        fill_rect(
            &mut img,
            center - BAR_WIDTH / 2,
            base - h,
            BAR_WIDTH,
            h,
            section_color(section),
        );
        draw_text(&mut img, &n.to_string(), center, base - h - SCALE, SCALE);
        draw_text(&mut img, tick_label(section), center, base + 4 + 5 * AXIS_SCALE, AXIS_SCALE);
    }
    img
}

/// 绘制柱状图并保存到 `path`. 图片格式由扩展名决定.
pub fn save_distribution_chart<P: AsRef<Path>>(
    path: P,
    num_train: usize,
    num_val: usize,
    num_test: usize,
) -> ImageResult<()> {
    distribution_chart(num_train, num_val, num_test).save(path)
}

#[cfg(test)]
mod tests {
    use super::{
        bar_center, distribution_chart, glyph, save_distribution_chart, section_color, BLACK,
        BOTTOM, HEIGHT, LEFT, TOP, WIDTH,
    };
    use crate::dataset::Section;

    /// 第 `k` 根柱子中心列右侧该颜色像素的个数.
    fn bar_height(img: &image::RgbImage, k: u32, s: Section) -> usize {
        let x = bar_center(k) + 10;
        (0..img.height())
            .filter(|&y| *img.get_pixel(x, y) == section_color(s))
            .count()
    }

    /// 矩形区域 `[x0, x1) x [y0, y1)` 内黑色像素的个数.
    fn black_in(img: &image::RgbImage, x0: u32, x1: u32, y0: u32, y1: u32) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) == BLACK)
            .count()
    }

    #[test]
    fn test_bar_heights_are_proportional() {
        let img = distribution_chart(80, 40, 0);
        let train = bar_height(&img, 0, Section::Training);
        let val = bar_height(&img, 1, Section::Validation);
        let test = bar_height(&img, 2, Section::Test);

        assert!(train > 0 && train < HEIGHT as usize);
        assert!((train as i64 - 2 * val as i64).abs() <= 1);
        assert_eq!(test, 0);
    }

    #[test]
    fn test_all_empty() {
        let img = distribution_chart(0, 0, 0);
        for (k, s) in Section::ALL.into_iter().enumerate() {
            assert_eq!(bar_height(&img, k as u32, s), 0);
        }
    }

    #[test]
    fn test_title_and_axis_labels() {
        let img = distribution_chart(10, 3, 1);
        let base = HEIGHT - BOTTOM;

        // 标题.
        assert!(black_in(&img, 0, WIDTH, 0, TOP) > 0);
        // 纵轴标签, 不含纵轴本身.
        assert!(black_in(&img, 0, LEFT - 1, 0, HEIGHT) > 0);
        // 每根柱子下方的刻度文字.
        for k in 0..3 {
            let c = bar_center(k);
            assert!(black_in(&img, c - 20, c + 20, base + 2, HEIGHT) > 0);
        }
    }

    #[test]
    fn test_glyphs_cover_chart_text() {
        for text in ["DATA DISTRIBUTION", "NUMBER OF IMAGES", "TRAIN", "VAL", "TEST", "0123456789"] {
            assert!(text.chars().all(|c| glyph(c).is_some()), "{text}");
        }
        assert!(glyph('?').is_none());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distribution.png");
        save_distribution_chart(&path, 296, 70, 3).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    }
}
