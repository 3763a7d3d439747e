use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 错误的大类，调用方据此决定是中止还是跳过当前图片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 配置错误，当前操作必须中止
    Configuration,
    /// 查询向量与已存储向量长度不一致
    DescriptorMismatch,
    /// 单张图片或单个特征流的读写错误
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("未知的描述符类型: {0}，有效范围为 1-10")]
    UnknownDescriptor(u8),

    #[error("未知的距离度量: {0}，有效范围为 1-2")]
    UnknownMetric(u8),

    #[error("无法读取图片集合 {}: {source}", path.display())]
    Collection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无效的参数: {0}")]
    InvalidParameter(String),

    #[error("特征流 {stream} 中 {id} 的描述符长度为 {found}，查询描述符长度为 {expected}")]
    DescriptorMismatch { stream: String, id: String, expected: usize, found: usize },

    #[error("区域 {width}x{height}+{x}+{y} 超出图片范围 {cols}x{rows}")]
    RegionOutOfBounds { x: usize, y: usize, width: usize, height: usize, cols: usize, rows: usize },

    #[error("图片为空")]
    EmptyImage,

    #[error("无法保存图片 ID {id}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("图片解码失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("特征库错误: {0}")]
    Store(#[from] heed::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownDescriptor(_)
            | Self::UnknownMetric(_)
            | Self::Collection { .. }
            | Self::InvalidParameter(_) => ErrorKind::Configuration,
            Self::DescriptorMismatch { .. } => ErrorKind::DescriptorMismatch,
            Self::RegionOutOfBounds { .. }
            | Self::EmptyImage
            | Self::InvalidId { .. }
            | Self::Image(_)
            | Self::Io(_)
            | Self::Store(_) => ErrorKind::Io,
        }
    }
}
