use ndarray::Array2;

use super::{correlate_separable, saturate_u8};
use crate::error::Result;
use crate::histogram;
use crate::img::{GrayImage, Image};

/// Law's 纹理能量的 5 个一维核：L5（已除以 16）、E5、S5、W5、R5
pub const LAWS_KERNELS: [[f64; 5]; 5] = [
    [1. / 16., 4. / 16., 6. / 16., 4. / 16., 1. / 16.],
    [1., 2., 0., -2., -1.],
    [-1., 0., 2., 0., -1.],
    [1., -2., 0., 2., -1.],
    [1., -4., 6., -4., 1.],
];

/// 累加结果的除数
///
/// 一共有 15 组 (i, j) 组合，但这里除以 14，保持原有行为不做修正
pub const LAWS_DIVISOR: f32 = 14.;

/// Law's 纹理直方图固定使用的 bins
pub const LAWS_BINS: usize = 8;

/// 对所有 `i <= j` 的核组合做可分离滤波（核 i 作行滤波，核 j 作列滤波），
/// 每次的结果先截断到 8 位，再累加后除以 [`LAWS_DIVISOR`]
pub fn laws_filter(gray: &GrayImage) -> GrayImage {
    let mut sum = Array2::<f32>::zeros((gray.rows(), gray.cols()));
    for i in 0..LAWS_KERNELS.len() {
        for j in i..LAWS_KERNELS.len() {
            let filtered = correlate_separable(gray.view(), &LAWS_KERNELS[i], &LAWS_KERNELS[j]);
            sum.zip_mut_with(&filtered, |acc, &v| *acc += saturate_u8(v) as f32);
        }
    }
    GrayImage::from_array(sum.mapv(|v| saturate_u8((v / LAWS_DIVISOR) as f64)))
}

/// Law's 纹理描述符，不论调用方传入多少 bins，都使用 [`LAWS_BINS`]
pub fn laws_texture(image: &Image) -> Result<Vec<f32>> {
    histogram::hard_gray(&laws_filter(&image.to_gray()), LAWS_BINS)
}
