use std::path::Path;

use heed::types::{SerdeBincode, Str};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn, WithTls};
use log::debug;

use super::{FeatureRecord, FeatureStore};
use crate::error::{Error, Result};

/// lmdb 默认编译选项下的最大键长度
pub const MAX_KEY_SIZE: usize = 511;

type StreamDb = Database<Str, SerdeBincode<Vec<f32>>>;

/// 基于 lmdb 的特征存储，每个特征流对应一个命名数据库
pub struct LmdbFeatureStore {
    env: Env<WithTls>,
}

impl LmdbFeatureStore {
    /// 打开或创建特征库，`path` 为目录
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        debug!("打开特征库: {}", path.display());
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 36) // 只是虚拟地址空间，不会真正占用磁盘
                .max_dbs(32)
                .open(path)?
        };
        Ok(Self { env })
    }

    fn create_stream(&self, txn: &mut RwTxn, stream: &str) -> Result<StreamDb> {
        Ok(self.env.create_database(txn, Some(stream))?)
    }

    fn open_stream(&self, txn: &RoTxn<WithTls>, stream: &str) -> Result<Option<StreamDb>> {
        Ok(self.env.open_database(txn, Some(stream))?)
    }
}

impl FeatureStore for LmdbFeatureStore {
    fn validate_id(&self, id: &str) -> Result<()> {
        let reason = if id.is_empty() {
            "ID 为空".to_owned()
        } else if id.len() > MAX_KEY_SIZE {
            format!("长度 {} 超过 {} 字节", id.len(), MAX_KEY_SIZE)
        } else {
            return Ok(());
        };
        Err(Error::InvalidId { id: id.to_owned(), reason })
    }

    fn append(&mut self, stream: &str, id: &str, vector: &[f32], reset: bool) -> Result<()> {
        let mut txn = self.env.write_txn()?;
        let db = self.create_stream(&mut txn, stream)?;
        if reset {
            db.clear(&mut txn)?;
        }
        db.put(&mut txn, id, &vector.to_vec())?;
        txn.commit()?;
        Ok(())
    }

    fn append_many(&mut self, stream: &str, records: &[FeatureRecord], reset: bool) -> Result<()> {
        // 整批记录在同一个事务中写入
        let mut txn = self.env.write_txn()?;
        let db = self.create_stream(&mut txn, stream)?;
        if reset {
            db.clear(&mut txn)?;
        }
        for record in records {
            db.put(&mut txn, &record.id, &record.vector)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn clear(&mut self, stream: &str) -> Result<()> {
        let mut txn = self.env.write_txn()?;
        let db = self.create_stream(&mut txn, stream)?;
        db.clear(&mut txn)?;
        txn.commit()?;
        Ok(())
    }

    fn read(&self, stream: &str) -> Result<Vec<FeatureRecord>> {
        let txn = self.env.read_txn()?;
        let Some(db) = self.open_stream(&txn, stream)? else {
            return Ok(vec![]);
        };
        let mut records = Vec::with_capacity(db.len(&txn)? as usize);
        for item in db.iter(&txn)? {
            let (id, vector) = item?;
            records.push(FeatureRecord { id: id.to_owned(), vector });
        }
        Ok(records)
    }

    fn get(&self, stream: &str, id: &str) -> Result<Option<Vec<f32>>> {
        let txn = self.env.read_txn()?;
        match self.open_stream(&txn, stream)? {
            Some(db) => Ok(db.get(&txn, id)?),
            None => Ok(None),
        }
    }

    fn len(&self, stream: &str) -> Result<usize> {
        let txn = self.env.read_txn()?;
        match self.open_stream(&txn, stream)? {
            Some(db) => Ok(db.len(&txn)? as usize),
            None => Ok(0),
        }
    }
}
