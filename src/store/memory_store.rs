use std::collections::BTreeMap;

use super::{FeatureRecord, FeatureStore};
use crate::error::Result;

/// 内存中的特征存储
#[derive(Debug, Default, Clone)]
pub struct MemoryFeatureStore {
    streams: BTreeMap<String, BTreeMap<String, Vec<f32>>>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureStore for MemoryFeatureStore {
    fn append(&mut self, stream: &str, id: &str, vector: &[f32], reset: bool) -> Result<()> {
        let entries = self.streams.entry(stream.to_owned()).or_default();
        if reset {
            entries.clear();
        }
        entries.insert(id.to_owned(), vector.to_vec());
        Ok(())
    }

    fn clear(&mut self, stream: &str) -> Result<()> {
        self.streams.entry(stream.to_owned()).or_default().clear();
        Ok(())
    }

    fn read(&self, stream: &str) -> Result<Vec<FeatureRecord>> {
        Ok(self
            .streams
            .get(stream)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, vector)| FeatureRecord { id: id.clone(), vector: vector.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, stream: &str, id: &str) -> Result<Option<Vec<f32>>> {
        Ok(self.streams.get(stream).and_then(|entries| entries.get(id)).cloned())
    }

    fn len(&self, stream: &str) -> Result<usize> {
        Ok(self.streams.get(stream).map_or(0, |entries| entries.len()))
    }
}
