use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::descriptor::{DescriptorConfig, DescriptorType};
use crate::distance::DistanceMetric;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs =
        ProjectDirs::from("", "imretrieval", "imretrieval").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct DescriptorOptions {
    /// 描述符类型，1 到 10
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        default_value = "2",
        value_parser = parse_descriptor
    )]
    pub descriptor: DescriptorType,
    /// 每个通道的直方图 bin 数量
    #[arg(
        long,
        value_name = "N",
        default_value_t = 8,
        value_parser = clap::value_parser!(u16).range(1..=256)
    )]
    pub bins: u16,
    /// 软直方图的扩散宽度
    #[arg(
        long,
        value_name = "N",
        default_value_t = 5,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub soft_width: u16,
}

impl DescriptorOptions {
    /// 生成描述符配置，`metric` 为空时使用该类型的默认距离
    pub fn config(&self, metric: Option<DistanceMetric>) -> DescriptorConfig {
        let config = DescriptorConfig::new(self.descriptor)
            .bins(self.bins as usize)
            .soft_width(self.soft_width as usize);
        match metric {
            Some(metric) => config.metric(metric),
            None => config,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imretrieval", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// imretrieval 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 计算图片集的描述符并写入特征库
    Build(BuildCommand),
    /// 从特征库中搜索相似图片
    Search(SearchCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回特征库目录
    pub fn features(&self) -> PathBuf {
        self.path.join("features")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

fn parse_descriptor(s: &str) -> Result<DescriptorType, String> {
    let id = s.parse::<u8>().map_err(|e| format!("无效的描述符类型 {s}: {e}"))?;
    DescriptorType::try_from(id).map_err(|e| e.to_string())
}

pub(crate) fn parse_metric(s: &str) -> Result<DistanceMetric, String> {
    let id = s.parse::<u8>().map_err(|e| format!("无效的距离类型 {s}: {e}"))?;
    DistanceMetric::try_from(id).map_err(|e| e.to_string())
}
