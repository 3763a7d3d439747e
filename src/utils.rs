use std::path::{Path, PathBuf};

use indicatif::ProgressStyle;
use log::info;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .expect("valid progress template")
}

/// 根据逗号分隔的后缀列表构建不区分大小写的匹配正则
pub fn suffix_regex(suffix: &str) -> Result<Regex> {
    let pattern = format!("(?i)^({})$", suffix.replace(',', "|"));
    Regex::new(&pattern)
        .map_err(|e| Error::InvalidParameter(format!("无效的后缀列表 {suffix}: {e}")))
}

/// 扫描目录下所有后缀匹配的图片，按路径排序
pub fn scan_collection(path: impl AsRef<Path>, re_suf: &Regex) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path)
        .map_err(|source| Error::Collection { path: path.to_path_buf(), source })?;
    if !meta.is_dir() {
        return Err(Error::Collection {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "不是目录"),
        });
    }

    info!("开始扫描目录: {}", path.display());
    let mut entries = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| {
            entry.ok().and_then(|entry| {
                let path = entry.path();
                if path.is_file() {
                    if let Some(ext) = path.extension() {
                        if re_suf.is_match(&ext.to_string_lossy()) {
                            return Some(path.to_path_buf());
                        }
                    }
                }
                None
            })
        })
        .collect::<Vec<_>>();
    entries.sort();
    info!("扫描完成，共 {} 张图片", entries.len());

    Ok(entries)
}
