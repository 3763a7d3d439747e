use ndarray::prelude::*;

use crate::error::Result;
use crate::histogram;
use crate::img::Image;

// 两个方向各自只有一次 1D 滤波做了除以 4 的归一化，X 和 Y 的尺度并不对称，这里保持原样

/// X 方向 3x3 Sobel 滤波，向右为正
///
/// ```text
/// [-1, 0, 1]
/// [-2, 0, 2]  / 4
/// [-1, 0, 1]
/// ```
pub fn sobel_x(image: &Image) -> Array3<i16> {
    separable_3x3(image, [-1, 0, 1], 1, [1, 2, 1], 4)
}

/// Y 方向 3x3 Sobel 滤波，向上为正
///
/// ```text
/// [ 1,  2,  1]
/// [ 0,  0,  0]  / 4
/// [-1, -2, -1]
/// ```
pub fn sobel_y(image: &Image) -> Array3<i16> {
    separable_3x3(image, [1, 2, 1], 4, [1, 0, -1], 1)
}

/// 逐通道的 3x3 可分离滤波，最外一圈像素保持为 0
fn separable_3x3(
    image: &Image,
    row: [i16; 3],
    row_div: i16,
    col: [i16; 3],
    col_div: i16,
) -> Array3<i16> {
    let src = image.view();
    let (rows, cols, channels) = src.dim();
    let mut tmp = Array3::<i16>::zeros((rows, cols, channels));
    let mut dst = Array3::<i16>::zeros((rows, cols, channels));
    if rows < 3 || cols < 3 {
        return dst;
    }

    for i in 0..rows {
        for j in 1..cols - 1 {
            for c in 0..channels {
                let v: i16 = (0..3).map(|k| row[k] * src[[i, j + k - 1, c]] as i16).sum();
                tmp[[i, j, c]] = v / row_div;
            }
        }
    }

    for i in 1..rows - 1 {
        for j in 1..cols - 1 {
            for c in 0..channels {
                let v: i16 = (0..3).map(|k| col[k] * tmp[[i + k - 1, j, c]]).sum();
                dst[[i, j, c]] = v / col_div;
            }
        }
    }

    dst
}

/// 逐通道计算梯度幅值 `sqrt(sx^2 + sy^2)`，截断到 8 位
pub fn magnitude(sx: &Array3<i16>, sy: &Array3<i16>) -> Result<Image> {
    let data = Array3::from_shape_fn(sx.dim(), |idx| {
        let (x, y) = (sx[idx] as f32, sy[idx] as f32);
        // f32 -> u8 向零取整，并在 255 处饱和
        (x * x + y * y).sqrt() as u8
    });
    Image::from_array(data)
}

/// Sobel 纹理描述符：梯度幅值图转灰度后计算硬分箱直方图
pub fn sobel_texture(image: &Image, bins: usize) -> Result<Vec<f32>> {
    let mag = magnitude(&sobel_x(image), &sobel_y(image))?;
    histogram::hard_gray(&mag.to_gray(), bins)
}
