use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{DescriptorOptions, Opts};
use crate::retrieval::Retriever;
use crate::store::LmdbFeatureStore;
use crate::utils;

#[derive(Parser, Debug, Clone)]
pub struct BuildCommand {
    #[command(flatten)]
    pub descriptor: DescriptorOptions,
    /// 图片集目录
    pub path: String,
    /// 支持的图片后缀，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,png,ppm,tif")]
    pub suffix: String,
}

impl SubCommandExtend for BuildCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let config = self.descriptor.config(None);
        let re_suf = utils::suffix_regex(&self.suffix)?;
        let paths = utils::scan_collection(&self.path, &re_suf)?;

        let store = LmdbFeatureStore::open(opts.conf_dir.features())?;
        let mut retriever = Retriever::new(store);

        let pb = ProgressBar::new(paths.len() as u64).with_style(utils::pb_style());
        let stats = block_in_place(|| retriever.build_from_paths(&config, &paths, &pb))?;
        pb.finish_and_clear();

        info!("构建完成: 添加 {} 张图片，跳过 {} 张", stats.added, stats.skipped);
        Ok(())
    }
}
