use crate::error::Error;

/// 距离度量，值越小越相似
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// 差的平方和
    SumSquared = 1,
    /// 1 - 直方图交
    HistIntersection = 2,
}

impl DistanceMetric {
    /// 计算两个等长向量的距离，长度由调用方保证
    #[inline]
    pub fn distance(&self, x: &[f32], y: &[f32]) -> f32 {
        debug_assert_eq!(x.len(), y.len());
        match self {
            Self::SumSquared => sum_squared(x, y),
            Self::HistIntersection => hist_intersection(x, y),
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for DistanceMetric {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::SumSquared),
            2 => Ok(Self::HistIntersection),
            _ => Err(Error::UnknownMetric(id)),
        }
    }
}

#[inline]
pub fn sum_squared(x: &[f32], y: &[f32]) -> f32 {
    x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// 对归一化直方图而言结果在 [0, 1] 之间；软分箱直方图的和不为 1，结果可能为负
#[inline]
pub fn hist_intersection(x: &[f32], y: &[f32]) -> f32 {
    1. - x.iter().zip(y).map(|(a, b)| a.min(*b)).sum::<f32>()
}
