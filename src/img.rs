use std::path::Path;

use ndarray::prelude::*;

use crate::error::{Error, Result};

/// 图片上的矩形区域，坐标从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }
}

/// 三通道 8 位图片，形状为 (rows, cols, 3)，通道顺序为 B, G, R
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Array3<u8>,
}

/// 单通道 8 位灰度图片
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    data: Array2<u8>,
}

impl Image {
    /// 从 (rows, cols, 3) 的数组创建图片
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        if data.dim().2 != 3 {
            let msg = format!("图片通道数必须为 3，实际为 {}", data.dim().2);
            return Err(Error::InvalidParameter(msg));
        }
        Ok(Self { data })
    }

    /// 创建一张纯色图片
    pub fn filled(rows: usize, cols: usize, bgr: [u8; 3]) -> Self {
        let data = Array3::from_shape_fn((rows, cols, 3), |(_, _, c)| bgr[c]);
        Self { data }
    }

    /// 读取并解码图片文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let rgb = image::open(path)?.into_rgb8();
        Ok(Self::from_rgb8(&rgb))
    }

    /// 从内存中解码图片
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgb = image::load_from_memory(bytes)?.into_rgb8();
        Ok(Self::from_rgb8(&rgb))
    }

    fn from_rgb8(rgb: &image::RgbImage) -> Self {
        let (cols, rows) = rgb.dimensions();
        let data = Array3::from_shape_fn((rows as usize, cols as usize, 3), |(i, j, c)| {
            // RGB -> BGR
            rgb.get_pixel(j as u32, i as u32).0[2 - c]
        });
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        [self.data[[row, col, 0]], self.data[[row, col, 1]], self.data[[row, col, 2]]]
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 截取矩形区域，超出边界时返回错误
    pub fn crop(&self, rect: Rect) -> Result<Self> {
        if rect.x + rect.width > self.cols() || rect.y + rect.height > self.rows() {
            return Err(Error::RegionOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                cols: self.cols(),
                rows: self.rows(),
            });
        }
        let view =
            self.data.slice(s![rect.y..rect.y + rect.height, rect.x..rect.x + rect.width, ..]);
        Ok(Self { data: view.to_owned() })
    }

    /// 转为灰度图，系数与 BT.601 一致，使用 14 位定点数计算
    pub fn to_gray(&self) -> GrayImage {
        let data = Array2::from_shape_fn((self.rows(), self.cols()), |(i, j)| {
            let [b, g, r] = self.pixel(i, j);
            let v = 1868 * b as u32 + 9617 * g as u32 + 4899 * r as u32 + (1 << 13);
            (v >> 14) as u8
        });
        GrayImage { data }
    }
}

impl GrayImage {
    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    /// 将灰度值复制到三个通道
    pub fn to_bgr(&self) -> Image {
        let data =
            Array3::from_shape_fn((self.rows(), self.cols(), 3), |(i, j, _)| self.data[[i, j]]);
        Image { data }
    }
}
