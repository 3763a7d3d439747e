use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::descriptor::{DescriptorConfig, Feature, extract};
use crate::error::{Error, Result};
use crate::img::Image;
use crate::store::{FeatureRecord, FeatureStore};

/// 查询结果，距离越小越相似
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub distance: f32,
}

/// 构建统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    /// 成功写入的图片数量
    pub added: usize,
    /// 因解码、描述符计算失败或 ID 无法保存而跳过的图片数量
    pub skipped: usize,
}

/// 检索引擎，负责构建特征库和查询
pub struct Retriever<S> {
    store: S,
}

impl<S: FeatureStore> Retriever<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// 计算每张图片的描述符并写入特征库
    ///
    /// 本次构建中第一次写入某个特征流时会先清空该流。单张图片计算失败时跳过该图片。
    pub fn build<I, K>(&mut self, config: &DescriptorConfig, images: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = (K, Image)>,
        K: Into<String>,
    {
        let extracted = images.into_iter().map(|(id, image)| (id.into(), extract(config, &image)));
        self.persist(config, extracted)
    }

    /// 并行读取图片并计算描述符，图片 ID 为文件路径
    pub fn build_from_paths(
        &mut self,
        config: &DescriptorConfig,
        paths: &[PathBuf],
        pb: &ProgressBar,
    ) -> Result<BuildStats> {
        let instant = Instant::now();
        let extracted = paths
            .par_iter()
            .progress_with(pb.clone())
            .map(|path| {
                let id = path.to_string_lossy().into_owned();
                let features = Image::open(path).and_then(|image| extract(config, &image));
                (id, features)
            })
            .collect::<Vec<_>>();
        debug!("描述符计算耗时: {:.2}s", instant.elapsed().as_secs_f32());

        self.persist(config, extracted)
    }

    /// 按特征流归类后批量写入
    fn persist<I>(&mut self, config: &DescriptorConfig, extracted: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = (String, Result<Vec<Feature>>)>,
    {
        let streams = config.streams();
        let mut grouped = vec![Vec::new(); streams.len()];
        let mut stats = BuildStats::default();

        for (id, features) in extracted {
            // 存储拒绝的 ID 会让整个批次写入失败，提前剔除
            let features = features.and_then(|f| self.store.validate_id(&id).map(|_| f));
            match features {
                Ok(features) => {
                    for (records, feature) in grouped.iter_mut().zip(features) {
                        records.push(FeatureRecord { id: id.clone(), vector: feature.vector });
                    }
                    stats.added += 1;
                }
                Err(e) => {
                    warn!("跳过图片 {}: {}", id, e);
                    stats.skipped += 1;
                }
            }
        }

        for (spec, records) in streams.iter().zip(&grouped) {
            // 没有任何记录时不清空旧数据
            if records.is_empty() {
                continue;
            }
            self.store.append_many(spec.name, records, true)?;
            info!("写入特征流 {}: {} 条", spec.name, records.len());
        }

        Ok(stats)
    }

    /// 查询与图片最相似的 k 张图片
    ///
    /// 每个特征流的距离乘以权重后按图片 ID 累加，只有在所有特征流中都存在的图片参与排序。
    /// 特征流无法读取时视为空。
    pub fn query(
        &self,
        config: &DescriptorConfig,
        image: &Image,
        k: usize,
    ) -> Result<Vec<Candidate>> {
        let instant = Instant::now();
        let features = extract(config, image)?;
        let metric = config.metric;
        let mut counter: HashMap<String, (f32, usize)> = HashMap::new();

        for feature in &features {
            let records = self.store.read(feature.stream).unwrap_or_else(|e| {
                warn!("无法读取特征流 {}: {}", feature.stream, e);
                vec![]
            });
            debug!("特征流 {}: {} 条记录", feature.stream, records.len());

            for record in records {
                if record.vector.len() != feature.vector.len() {
                    return Err(Error::DescriptorMismatch {
                        stream: feature.stream.to_owned(),
                        id: record.id,
                        expected: feature.vector.len(),
                        found: record.vector.len(),
                    });
                }
                let distance = feature.weight * metric.distance(&feature.vector, &record.vector);
                let entry = counter.entry(record.id).or_insert((0., 0));
                entry.0 += distance;
                entry.1 += 1;
            }
        }

        let total = counter.len();
        let mut results = counter
            .into_iter()
            .filter(|(_, (_, count))| *count == features.len())
            .map(|(id, (distance, _))| Candidate { id, distance })
            .collect::<Vec<_>>();
        if results.len() < total {
            debug!("{} 张图片缺少部分特征流，已忽略", total - results.len());
        }

        results.sort_unstable_by(|a, b| {
            a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(k);

        debug!("search time: {:.2}s", instant.elapsed().as_secs_f32());

        Ok(results)
    }

    /// 读取图片后查询
    pub fn query_path(
        &self,
        config: &DescriptorConfig,
        path: impl AsRef<Path>,
        k: usize,
    ) -> Result<Vec<Candidate>> {
        let image = Image::open(path)?;
        self.query(config, &image, k)
    }
}
