use std::f64::consts::PI;

use ndarray::Array2;

use super::{correlate_2d, saturate_u8};
use crate::error::Result;
use crate::histogram;
use crate::img::{GrayImage, Image};

/// Gabor 核参数
#[derive(Debug, Clone, Copy)]
pub struct GaborParams {
    /// 核大小，实际生成的核为 `(ksize / 2) * 2 + 1`
    pub ksize: usize,
    pub sigma: f64,
    pub theta: f64,
    pub lambda: f64,
    pub gamma: f64,
    pub psi: f64,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self { ksize: 20, sigma: 2., theta: 0., lambda: 5., gamma: 2., psi: 0. }
    }
}

/// Gabor 纹理直方图固定使用的 bins
pub const GABOR_BINS: usize = 8;

/// 生成实数 Gabor 核
pub fn gabor_kernel(params: &GaborParams) -> Array2<f32> {
    let half = (params.ksize / 2) as isize;
    let sigma_x = params.sigma;
    let sigma_y = params.sigma / params.gamma;
    let ex = -0.5 / (sigma_x * sigma_x);
    let ey = -0.5 / (sigma_y * sigma_y);
    let cscale = 2. * PI / params.lambda;
    let (c, s) = (params.theta.cos(), params.theta.sin());

    let size = (2 * half + 1) as usize;
    Array2::from_shape_fn((size, size), |(row, col)| {
        // 核按 (half - y, half - x) 存储
        let y = (half - row as isize) as f64;
        let x = (half - col as isize) as f64;
        let xr = x * c + y * s;
        let yr = -x * s + y * c;
        ((ex * xr * xr + ey * yr * yr).exp() * (cscale * xr + params.psi).cos()) as f32
    })
}

/// 线性拉伸到 `[0, 255]`，所有像素相同时输出全 0
pub fn normalize_min_max(gray: &GrayImage) -> GrayImage {
    let view = gray.view();
    let min = view.iter().copied().min().unwrap_or(0) as f64;
    let max = view.iter().copied().max().unwrap_or(0) as f64;
    let scale = if max > min { 255. / (max - min) } else { 0. };
    GrayImage::from_array(view.mapv(|v| saturate_u8((v as f64 - min) * scale)))
}

/// 灰度图与 Gabor 核滤波，结果截断到 8 位后做 min-max 归一化
pub fn gabor_filter(gray: &GrayImage, params: &GaborParams) -> GrayImage {
    let kernel = gabor_kernel(params);
    let filtered = correlate_2d(gray.view(), kernel.view()).mapv(saturate_u8);
    normalize_min_max(&GrayImage::from_array(filtered))
}

/// Gabor 纹理描述符，固定使用默认参数和 [`GABOR_BINS`]
pub fn gabor_texture(image: &Image) -> Result<Vec<f32>> {
    let filtered = gabor_filter(&image.to_gray(), &GaborParams::default());
    histogram::hard_gray(&filtered, GABOR_BINS)
}
