//! 手写的卷积滤波器
//!
//! 除 Sobel 外的滤波器均作用于灰度图，边界使用 reflect-101 方式延拓（`dcb|abcd|cba`）。
//! 这里的“卷积”实际上是相关运算，核不做翻转，与常见图像库的 filter2D 行为一致。

mod gabor;
mod laws;
mod sobel;

pub use gabor::*;
pub use laws::*;
pub use sobel::*;

use ndarray::prelude::*;

/// reflect-101 边界映射，将任意下标映射回 `[0, n)`
pub fn reflect_101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    // 核半径可能大于图片尺寸，需要多次反射
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

/// 可分离滤波：先用 `row` 沿水平方向滤波，再用 `col` 沿垂直方向滤波
pub fn correlate_separable(src: ArrayView2<u8>, row: &[f64], col: &[f64]) -> Array2<f64> {
    let (rows, cols) = src.dim();
    let (rr, cr) = ((row.len() / 2) as isize, (col.len() / 2) as isize);

    let horizontal = Array2::from_shape_fn((rows, cols), |(i, j)| {
        row.iter()
            .enumerate()
            .map(|(k, w)| w * src[[i, reflect_101(j as isize + k as isize - rr, cols)]] as f64)
            .sum::<f64>()
    });

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        col.iter()
            .enumerate()
            .map(|(k, w)| w * horizontal[[reflect_101(i as isize + k as isize - cr, rows), j]])
            .sum::<f64>()
    })
}

/// 二维滤波，锚点为核中心
pub fn correlate_2d(src: ArrayView2<u8>, kernel: ArrayView2<f32>) -> Array2<f64> {
    let (rows, cols) = src.dim();
    let (kh, kw) = kernel.dim();
    let (ay, ax) = ((kh / 2) as isize, (kw / 2) as isize);

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let mut sum = 0f64;
        for ((ky, kx), &w) in kernel.indexed_iter() {
            let y = reflect_101(i as isize + ky as isize - ay, rows);
            let x = reflect_101(j as isize + kx as isize - ax, cols);
            sum += w as f64 * src[[y, x]] as f64;
        }
        sum
    })
}

/// 四舍五入并截断到 `[0, 255]`，相当于输出到 8 位图片
pub fn saturate_u8(v: f64) -> u8 {
    v.round().clamp(0., 255.) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        // n = 5: ... 2 1 | 0 1 2 3 4 | 3 2 ...
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        // 半径超过尺寸时多次反射
        assert_eq!(reflect_101(-4, 3), 0);
        assert_eq!(reflect_101(10, 1), 0);
    }

    #[test]
    fn test_correlate_identity() {
        let src = Array2::from_shape_fn((4, 5), |(i, j)| (i * 5 + j) as u8);
        let out = correlate_separable(src.view(), &[0., 1., 0.], &[0., 1., 0.]);
        assert!(out.iter().zip(src.iter()).all(|(&a, &b)| a == b as f64));

        let kernel = array![[0f32, 0., 0.], [0., 1., 0.], [0., 0., 0.]];
        let out = correlate_2d(src.view(), kernel.view());
        assert!(out.iter().zip(src.iter()).all(|(&a, &b)| a == b as f64));
    }

    #[test]
    fn test_correlate_not_flipped() {
        // 核 [1, 0, 0] 取左边的像素
        let src = array![[10u8, 20, 30]];
        let out = correlate_separable(src.view(), &[1., 0., 0.], &[1.]);
        assert_eq!(out, array![[20., 10., 20.]]);
    }

    #[test]
    fn test_saturate_u8() {
        assert_eq!(saturate_u8(-3.2), 0);
        assert_eq!(saturate_u8(300.), 255);
        assert_eq!(saturate_u8(12.6), 13);
    }
}
