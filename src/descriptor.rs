use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::filters;
use crate::histogram;
use crate::img::{Image, Rect};

/// 描述符类型，编号 1-10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// 中心 9x9 像素
    Middle = 1,
    /// 三维直方图
    Hist = 2,
    /// 上下两半各一个三维直方图
    HistHalves = 3,
    /// 三维直方图 + Sobel 纹理直方图
    HistSobel = 4,
    /// 中心 100x100 和 50x50 区域的三维直方图 + Gabor 纹理直方图
    HistMiddleGabor = 5,
    /// 三维软分箱直方图
    HistSoft = 6,
    /// 三维直方图 + Law's 纹理直方图
    HistLaws = 7,
    /// Sobel 纹理直方图
    Sobel = 8,
    /// Law's 纹理直方图
    Laws = 9,
    /// Gabor 纹理直方图
    Gabor = 10,
}

impl DescriptorType {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// 该描述符类型默认使用的距离度量
    pub fn default_metric(&self) -> DistanceMetric {
        match self {
            Self::Middle => DistanceMetric::SumSquared,
            _ => DistanceMetric::HistIntersection,
        }
    }
}

impl TryFrom<u8> for DescriptorType {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Ok(match id {
            1 => Self::Middle,
            2 => Self::Hist,
            3 => Self::HistHalves,
            4 => Self::HistSobel,
            5 => Self::HistMiddleGabor,
            6 => Self::HistSoft,
            7 => Self::HistLaws,
            8 => Self::Sobel,
            9 => Self::Laws,
            10 => Self::Gabor,
            _ => return Err(Error::UnknownDescriptor(id)),
        })
    }
}

/// 计算描述符之前截取的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Whole,
    UpperHalf,
    LowerHalf,
    /// 以图片中心为中心的正方形
    Centered(usize),
}

impl Region {
    pub fn rect(&self, image: &Image) -> Rect {
        let (rows, cols) = (image.rows(), image.cols());
        match *self {
            Self::Whole => Rect::new(0, 0, cols, rows),
            Self::UpperHalf => {
                Rect::new(0, 0, cols.saturating_sub(1), rows.saturating_sub(1) / 2)
            }
            Self::LowerHalf => {
                Rect::new(0, rows / 2 + 1, cols.saturating_sub(1), rows.saturating_sub(1) / 2)
            }
            Self::Centered(size) => centered(image, size, size),
        }
    }
}

/// 图片中心，奇数尺寸时偏向右下
fn center(image: &Image) -> (usize, usize) {
    let (rows, cols) = (image.rows(), image.cols());
    (rows / 2 + rows % 2, cols / 2 + cols % 2)
}

/// 以图片中心为中心的 `width x height` 区域
///
/// 窗口超出右下边界时向左上平移，只要图片不小于窗口就能完整截取；
/// 图片比窗口小时左上角为 0，由 crop 报告越界
fn centered(image: &Image, width: usize, height: usize) -> Rect {
    let (mid_row, mid_col) = center(image);
    let x = mid_col.saturating_sub(width / 2).min(image.cols().saturating_sub(width));
    let y = mid_row.saturating_sub(height / 2).min(image.rows().saturating_sub(height));
    Rect::new(x, y, width, height)
}

/// 对截取区域执行的计算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// 原始像素，不做直方图
    Raw { width: usize, height: usize },
    Hard { bins: usize },
    Soft { bins: usize, soft_width: usize },
    Sobel { bins: usize },
    /// 固定 8 bins
    Laws,
    /// 固定 8 bins
    Gabor,
}

impl Pipeline {
    pub fn compute(&self, image: &Image) -> Result<Vec<f32>> {
        match *self {
            Self::Raw { width, height } => raw_window(image, width, height),
            Self::Hard { bins } => histogram::hard(image, bins),
            Self::Soft { bins, soft_width } => histogram::soft(image, bins, soft_width),
            Self::Sobel { bins } => filters::sobel_texture(image, bins),
            Self::Laws => filters::laws_texture(image),
            Self::Gabor => filters::gabor_texture(image),
        }
    }
}

/// 一个特征流：保存在同一个流中的描述符使用相同的区域、计算方式和权重
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSpec {
    pub name: &'static str,
    pub region: Region,
    pub pipeline: Pipeline,
    pub weight: f32,
}

/// 描述符配置，构建和查询必须使用相同的配置
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorConfig {
    pub kind: DescriptorType,
    pub metric: DistanceMetric,
    pub bins: usize,
    pub soft_width: usize,
    /// 原始像素描述符的窗口大小 (width, height)
    pub raw_size: (usize, usize),
    /// 类型 5 使用的两个中心窗口边长
    pub window_sizes: (usize, usize),
}

impl DescriptorConfig {
    pub fn new(kind: DescriptorType) -> Self {
        Self {
            kind,
            metric: kind.default_metric(),
            bins: 8,
            soft_width: 5,
            raw_size: (9, 9),
            window_sizes: (100, 50),
        }
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn soft_width(mut self, soft_width: usize) -> Self {
        self.soft_width = soft_width;
        self
    }

    /// 返回该配置对应的所有特征流
    pub fn streams(&self) -> Vec<StreamSpec> {
        use Pipeline::*;
        use Region::*;

        let bins = self.bins;
        let stream = |name, region, pipeline, weight| StreamSpec { name, region, pipeline, weight };
        let hist = stream("hist", Whole, Hard { bins }, 1.);
        let (med, small) = self.window_sizes;

        match self.kind {
            DescriptorType::Middle => {
                let (width, height) = self.raw_size;
                vec![stream("middle", Whole, Raw { width, height }, 1.)]
            }
            DescriptorType::Hist => vec![hist],
            DescriptorType::HistHalves => vec![
                stream("hist_upper_half", UpperHalf, Hard { bins }, 0.5),
                stream("hist_lower_half", LowerHalf, Hard { bins }, 0.5),
            ],
            DescriptorType::HistSobel => vec![
                StreamSpec { weight: 0.5, ..hist },
                stream("hist_sobel", Whole, Sobel { bins }, 0.5),
            ],
            DescriptorType::HistMiddleGabor => vec![
                stream("hist_middle_med", Centered(med), Hard { bins }, 0.1),
                stream("hist_middle_med_gabor", Centered(med), Gabor, 0.05),
                stream("hist_middle_small", Centered(small), Hard { bins }, 0.65),
                stream("hist_middle_small_gabor", Centered(small), Gabor, 0.2),
            ],
            DescriptorType::HistSoft => {
                vec![stream("hist_soft", Whole, Soft { bins, soft_width: self.soft_width }, 1.)]
            }
            DescriptorType::HistLaws => vec![
                StreamSpec { weight: 0.5, ..hist },
                stream("hist_laws", Whole, Laws, 0.5),
            ],
            DescriptorType::Sobel => vec![stream("hist_sobel", Whole, Sobel { bins }, 1.)],
            DescriptorType::Laws => vec![stream("hist_laws", Whole, Laws, 1.)],
            DescriptorType::Gabor => vec![stream("hist_gabor", Whole, Gabor, 1.)],
        }
    }
}

/// 一个特征流上的描述符
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub stream: &'static str,
    pub weight: f32,
    pub vector: Vec<f32>,
}

/// 按配置计算图片的全部描述符，顺序与 [`DescriptorConfig::streams`] 一致
pub fn extract(config: &DescriptorConfig, image: &Image) -> Result<Vec<Feature>> {
    config
        .streams()
        .into_iter()
        .map(|spec| -> Result<Feature> {
            // 原始像素描述符自己截取中心窗口
            let vector = match spec.region {
                Region::Whole => spec.pipeline.compute(image)?,
                region => spec.pipeline.compute(&image.crop(region.rect(image))?)?,
            };
            Ok(Feature { stream: spec.name, weight: spec.weight, vector })
        })
        .collect()
}

/// 截取中心 `width x height` 区域的像素，每个像素依次输出通道 0、1、2
pub fn raw_window(image: &Image, width: usize, height: usize) -> Result<Vec<f32>> {
    let window = image.crop(centered(image, width, height))?;
    Ok(window.view().iter().map(|&v| v as f32).collect())
}
