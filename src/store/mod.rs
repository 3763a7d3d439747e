mod lmdb_store;
mod memory_store;

pub use lmdb_store::*;
pub use memory_store::*;

use crate::error::Result;

/// 特征流中的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub id: String,
    pub vector: Vec<f32>,
}

/// 按特征流组织的描述符存储，流内以图片 ID 为键
pub trait FeatureStore {
    /// 检查图片 ID 能否作为键写入
    fn validate_id(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    /// 写入一条记录，`reset` 为真时先清空该特征流
    ///
    /// 同一 ID 重复写入时覆盖旧值
    fn append(&mut self, stream: &str, id: &str, vector: &[f32], reset: bool) -> Result<()>;

    /// 批量写入，注意默认实现会逐条调用 append
    fn append_many(&mut self, stream: &str, records: &[FeatureRecord], reset: bool) -> Result<()> {
        if reset {
            self.clear(stream)?;
        }
        for record in records {
            self.append(stream, &record.id, &record.vector, false)?;
        }
        Ok(())
    }

    /// 清空特征流
    fn clear(&mut self, stream: &str) -> Result<()>;

    /// 读取特征流中的全部记录，按 ID 排序；从未写入过的流返回空列表
    fn read(&self, stream: &str) -> Result<Vec<FeatureRecord>>;

    /// 读取单条记录
    fn get(&self, stream: &str, id: &str) -> Result<Option<Vec<f32>>>;

    /// 特征流中的记录数量
    fn len(&self, stream: &str) -> Result<usize>;
}
