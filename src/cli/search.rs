use anyhow::Result;
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use log::{debug, info};
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{DescriptorOptions, Opts, parse_metric};
use crate::distance::DistanceMetric;
use crate::retrieval::{Candidate, Retriever};
use crate::store::{FeatureStore, LmdbFeatureStore};
use crate::utils;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub descriptor: DescriptorOptions,
    /// 被搜索的图片路径
    pub image: String,
    /// 距离度量，1 为平方差之和，2 为直方图交集，默认由描述符类型决定
    #[arg(short, long, value_name = "METRIC", value_parser = parse_metric)]
    pub metric: Option<DistanceMetric>,
    /// 显示的结果数量
    #[arg(short, value_name = "K", default_value_t = 10)]
    pub k: usize,
    /// 搜索前先用该目录重新构建特征库
    #[arg(long, value_name = "DIR", requires = "rebuild")]
    pub collection: Option<String>,
    /// 重新构建特征库
    #[arg(long, requires = "collection")]
    pub rebuild: bool,
    /// 图片集支持的后缀
    #[arg(short, long, default_value = "jpg,png,ppm,tif")]
    pub suffix: String,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let config = self.descriptor.config(self.metric);
        let store = LmdbFeatureStore::open(opts.conf_dir.features())?;
        let mut retriever = Retriever::new(store);

        if let (true, Some(collection)) = (self.rebuild, &self.collection) {
            let re_suf = utils::suffix_regex(&self.suffix)?;
            let paths = utils::scan_collection(collection, &re_suf)?;
            let pb = ProgressBar::new(paths.len() as u64).with_style(utils::pb_style());
            let stats = block_in_place(|| retriever.build_from_paths(&config, &paths, &pb))?;
            pb.finish_and_clear();
            info!("重新构建完成: 添加 {} 张图片，跳过 {} 张", stats.added, stats.skipped);
        }

        for spec in config.streams() {
            debug!("{:<24}: {}", spec.name, retriever.store().len(spec.name)?);
        }

        let result = block_in_place(|| retriever.query_path(&config, &self.image, self.k))?;
        print_result(&result, self)
    }
}

fn print_result(result: &[Candidate], opts: &SearchCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for candidate in result {
                println!("{:.4}\t{}", candidate.distance, candidate.id);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    Json,
    Table,
}
