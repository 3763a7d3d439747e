use std::fs;

use anyhow::Result;
use imretrieval::descriptor::DescriptorConfig;
use imretrieval::{
    DescriptorType, DistanceMetric, Error, FeatureStore, Image, LmdbFeatureStore,
    MemoryFeatureStore, Retriever,
};
use indicatif::ProgressBar;
use ndarray::Array3;
use rstest::*;
use tempfile::tempdir;

const SIZE: usize = 120;

/// 三张颜色互不重叠的图片：偏红的渐变、偏绿的棋盘格、偏蓝的条纹
fn synthetic(name: &str) -> Image {
    let data = Array3::from_shape_fn((SIZE, SIZE, 3), |(y, x, c)| {
        let low = [(y % 32) as u8, (x % 32) as u8];
        match (name, c) {
            ("red", 2) => 192 + ((x + y) % 64) as u8,
            ("red", c) => low[c],
            ("green", 1) => 192 + (((x / 8 + y / 8) % 2) * 60) as u8,
            ("green", 0) => (x % 32) as u8,
            ("green", _) => (y % 32) as u8,
            ("blue", 0) => 192 + ((x * 3) % 64) as u8,
            ("blue", c) => low[c - 1],
            _ => unreachable!(),
        }
    });
    Image::from_array(data).unwrap()
}

#[fixture]
fn collection() -> Vec<(String, Image)> {
    ["red", "green", "blue"].iter().map(|name| (name.to_string(), synthetic(name))).collect()
}

fn memory_retriever(
    config: &DescriptorConfig,
    images: Vec<(String, Image)>,
) -> Result<Retriever<MemoryFeatureStore>> {
    let mut retriever = Retriever::new(MemoryFeatureStore::new());
    let stats = retriever.build(config, images)?;
    assert_eq!(stats.skipped, 0);
    Ok(retriever)
}

#[rstest]
fn query_returns_itself_first(
    collection: Vec<(String, Image)>,
    #[values(2, 3, 4, 5, 6, 7)] descriptor: u8,
    #[values(1, 2)] metric: u8,
) -> Result<()> {
    let config = DescriptorConfig::new(DescriptorType::try_from(descriptor)?)
        .metric(DistanceMetric::try_from(metric)?);
    let retriever = memory_retriever(&config, collection.clone())?;

    for (id, image) in &collection {
        let result = retriever.query(&config, image, 1)?;
        assert_eq!(result.len(), 1);
        assert_eq!(&result[0].id, id);
    }
    Ok(())
}

#[rstest]
fn raw_pixels_return_itself_first(collection: Vec<(String, Image)>) -> Result<()> {
    let config = DescriptorConfig::new(DescriptorType::Middle);
    assert_eq!(config.metric, DistanceMetric::SumSquared);
    let retriever = memory_retriever(&config, collection.clone())?;

    for (id, image) in &collection {
        let result = retriever.query(&config, image, 1)?;
        assert_eq!(&result[0].id, id);
        assert_eq!(result[0].distance, 0.);
    }
    Ok(())
}

#[rstest]
#[case::sobel(8)]
#[case::laws(9)]
#[case::gabor(10)]
fn texture_query_ranks_itself_on_top(
    collection: Vec<(String, Image)>,
    #[case] descriptor: u8,
) -> Result<()> {
    // 纹理直方图可能与其他图片相同，只要求自身位于并列第一
    let config = DescriptorConfig::new(DescriptorType::try_from(descriptor)?);
    let retriever = memory_retriever(&config, collection.clone())?;

    for (id, image) in &collection {
        let result = retriever.query(&config, image, collection.len())?;
        assert_eq!(result.len(), collection.len());
        let own = result.iter().find(|c| &c.id == id).unwrap();
        assert!(own.distance <= result[0].distance + 1e-5);
        assert!(own.distance.abs() < 1e-5);
    }
    Ok(())
}

#[test]
fn uniform_colors() -> Result<()> {
    let config = DescriptorConfig::new(DescriptorType::Hist);
    let images = vec![
        ("a".to_string(), Image::filled(20, 30, [10, 10, 10])),
        ("b".to_string(), Image::filled(20, 30, [250, 250, 250])),
    ];
    let retriever = memory_retriever(&config, images)?;

    let result = retriever.query(&config, &Image::filled(5, 5, [10, 10, 10]), 2)?;
    let ids: Vec<_> = result.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(result[0].distance.abs() < 1e-6);
    assert!((result[1].distance - 1.).abs() < 1e-6);
    Ok(())
}

#[rstest]
fn mismatched_bins(collection: Vec<(String, Image)>) -> Result<()> {
    let config = DescriptorConfig::new(DescriptorType::Hist);
    let retriever = memory_retriever(&config, collection)?;

    let err = retriever.query(&config.clone().bins(4), &synthetic("red"), 1).unwrap_err();
    assert!(matches!(err, Error::DescriptorMismatch { expected: 64, found: 512, .. }));
    Ok(())
}

#[rstest]
fn lmdb_store(collection: Vec<(String, Image)>) -> Result<()> {
    let dir = tempdir()?;
    let config = DescriptorConfig::new(DescriptorType::HistSobel);
    {
        let mut retriever = Retriever::new(LmdbFeatureStore::open(dir.path())?);
        retriever.build(&config, collection.clone())?;
        // 再次构建不会产生重复记录
        retriever.build(&config, collection.clone())?;
    }

    let retriever = Retriever::new(LmdbFeatureStore::open(dir.path())?);
    assert_eq!(retriever.store().len("hist")?, 3);
    assert_eq!(retriever.store().len("hist_sobel")?, 3);

    let result = retriever.query(&config, &synthetic("green"), 1)?;
    assert_eq!(result[0].id, "green");
    Ok(())
}

#[test]
fn build_from_paths() -> Result<()> {
    let dir = tempdir()?;
    let mut paths = vec![];
    for name in ["red", "green", "blue"] {
        let source = synthetic(name);
        let rgb = image::RgbImage::from_fn(SIZE as u32, SIZE as u32, |x, y| {
            let [b, g, r] = source.pixel(y as usize, x as usize);
            image::Rgb([r, g, b])
        });
        let path = dir.path().join(format!("{name}.png"));
        rgb.save(&path)?;
        paths.push(path);
    }
    let broken = dir.path().join("broken.png");
    fs::write(&broken, b"not a png")?;
    paths.push(broken);

    let config = DescriptorConfig::new(DescriptorType::HistHalves);
    let mut retriever = Retriever::new(LmdbFeatureStore::open(dir.path().join("features"))?);
    let stats = retriever.build_from_paths(&config, &paths, &ProgressBar::hidden())?;
    assert_eq!(stats.added, 3);
    assert_eq!(stats.skipped, 1);

    let result = retriever.query_path(&config, &paths[2], 3)?;
    assert_eq!(result[0].id, paths[2].to_string_lossy());
    Ok(())
}

#[rstest]
fn lmdb_skips_unstorable_ids(collection: Vec<(String, Image)>) -> Result<()> {
    let dir = tempdir()?;
    let config = DescriptorConfig::new(DescriptorType::HistHalves);
    let mut images = collection;
    images.push(("x".repeat(600), synthetic("red")));

    let mut retriever = Retriever::new(LmdbFeatureStore::open(dir.path())?);
    let stats = retriever.build(&config, images)?;
    assert_eq!(stats.added, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(retriever.store().len("hist_upper_half")?, 3);
    assert_eq!(retriever.store().len("hist_lower_half")?, 3);

    let result = retriever.query(&config, &synthetic("red"), 1)?;
    assert_eq!(result[0].id, "red");
    Ok(())
}
