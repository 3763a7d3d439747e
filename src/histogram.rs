//! 三维颜色直方图
//!
//! 直方图的三个维度依次对应通道 0、1、2，展平时按行优先顺序输出，
//! 即通道 0 变化最慢，通道 2 变化最快。

use ndarray::Array3;

use crate::error::{Error, Result};
use crate::img::{GrayImage, Image};

fn check_params(image: &Image, bins: usize) -> Result<()> {
    if bins == 0 || bins > 256 {
        return Err(Error::InvalidParameter(format!("bins 必须在 1-256 之间，实际为 {bins}")));
    }
    if image.is_empty() {
        return Err(Error::EmptyImage);
    }
    Ok(())
}

/// 展平并按像素数量归一化
fn flatten(hist: Array3<f32>, npixels: usize) -> Vec<f32> {
    let n = npixels as f32;
    hist.iter().map(|&count| count / n).collect()
}

/// 硬分箱直方图，每个像素投一票，结果之和为 1
pub fn hard(image: &Image, bins: usize) -> Result<Vec<f32>> {
    check_params(image, bins)?;
    let mut hist = Array3::<f32>::zeros((bins, bins, bins));
    for px in image.view().rows() {
        let idx = |v: u8| v as usize * bins / 256;
        hist[[idx(px[0]), idx(px[1]), idx(px[2])]] += 1.;
    }
    Ok(flatten(hist, image.rows() * image.cols()))
}

/// 灰度图的硬分箱直方图，灰度值被复制到三个通道，因此只有对角线上有值
pub fn hard_gray(image: &GrayImage, bins: usize) -> Result<Vec<f32>> {
    hard(&image.to_bgr(), bins)
}

/// 软分箱直方图
///
/// 每个像素在 `[-soft_width/2, -soft_width/2 + soft_width)` 范围内的每个偏移量上各投一票，
/// 三个通道使用同一个偏移量。归一化时只除以像素数量，因此结果之和为 `soft_width` 而不是 1。
pub fn soft(image: &Image, bins: usize, soft_width: usize) -> Result<Vec<f32>> {
    check_params(image, bins)?;
    if soft_width == 0 {
        return Err(Error::InvalidParameter("soft_width 不能为 0".to_owned()));
    }
    let sw = soft_width as i32;
    let start = -(sw / 2);
    let mut hist = Array3::<f32>::zeros((bins, bins, bins));
    for px in image.view().rows() {
        for w in start..start + sw {
            // 注意运算顺序：先除以 soft_width，再乘 bins，最后除以 256
            let idx = |v: u8| (v as i32 + w).clamp(0, 255) as usize / soft_width * bins / 256;
            hist[[idx(px[0]), idx(px[1]), idx(px[2])]] += 1.;
        }
    }
    Ok(flatten(hist, image.rows() * image.cols()))
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;

    const EPS: f32 = 1e-4;

    fn noisy(rows: usize, cols: usize) -> Image {
        let data = Array3::from_shape_fn((rows, cols, 3), |(i, j, c)| {
            ((i * 37 + j * 101 + c * 53) % 256) as u8
        });
        Image::from_array(data).unwrap()
    }

    #[test]
    fn test_hard_sum_and_len() {
        for bins in [1, 2, 8, 16] {
            let hist = hard(&noisy(23, 31), bins).unwrap();
            assert_eq!(hist.len(), bins * bins * bins);
            assert!((hist.iter().sum::<f32>() - 1.).abs() < EPS);
        }
    }

    #[test]
    fn test_hard_cell_order() {
        // B=255 G=0 R=128 -> (7, 0, 4)
        let hist = hard(&Image::filled(4, 4, [255, 0, 128]), 8).unwrap();
        assert_eq!(hist[7 * 64 + 4], 1.);
        assert_eq!(hist.iter().filter(|&&v| v > 0.).count(), 1);
    }

    #[test]
    fn test_hard_invalid_bins() {
        let img = noisy(4, 4);
        assert!(matches!(hard(&img, 0), Err(Error::InvalidParameter(_))));
        assert!(matches!(hard(&img, 257), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_hard_empty_image() {
        let img = Image::filled(0, 4, [0; 3]);
        assert!(matches!(hard(&img, 8), Err(Error::EmptyImage)));
    }

    #[test]
    fn test_hard_gray_on_diagonal() {
        let gray = noisy(10, 10).to_gray();
        let hist = hard_gray(&gray, 4).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    if i != j || j != k {
                        assert_eq!(hist[i * 16 + j * 4 + k], 0.);
                    }
                }
            }
        }
        assert!((hist.iter().sum::<f32>() - 1.).abs() < EPS);
    }

    #[test]
    fn test_soft_sums_to_width() {
        for (bins, width) in [(8, 5), (4, 3), (16, 1), (8, 4)] {
            let hist = soft(&noisy(17, 13), bins, width).unwrap();
            assert_eq!(hist.len(), bins * bins * bins);
            assert!((hist.iter().sum::<f32>() - width as f32).abs() < EPS);
        }
    }

    #[test]
    fn test_soft_bin_formula() {
        // 255 / 5 * 8 / 256 = 1，偏移后 253..=255 均落在 1，251..=252 同样为 1
        let hist = soft(&Image::filled(2, 2, [255; 3]), 8, 5).unwrap();
        assert!((hist[64 + 8 + 1] - 5.).abs() < EPS);
        // 0 附近的偏移被截断到 0
        let hist = soft(&Image::filled(2, 2, [0; 3]), 8, 5).unwrap();
        assert!((hist[0] - 5.).abs() < EPS);
    }

    #[test]
    fn test_soft_zero_width() {
        assert!(matches!(soft(&noisy(2, 2), 8, 0), Err(Error::InvalidParameter(_))));
    }
}
