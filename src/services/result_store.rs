//! 成绩表服务 - 业务能力层
//!
//! 以 (考试, 场次) 为分区、准考证号为键的成绩表。
//!
//! 同一分区上的"写入 + 重算排名"是一次读-改-写，用分区级互斥锁串行化；
//! 不同分区之间互不等待。整表在内存中改好、排好名次后一次性交给后端原子保存，
//! 所以读者只会看到写入前的表，或写入并重排后的表。
//!
//! 后端是同步文件 I/O，所有后端调用都放到 `spawn_blocking` 线程上执行。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ConfigError, StoreError};
use crate::infrastructure::shift_backend::{JsonFileBackend, MemoryBackend, ShiftBackend};
use crate::models::exam::SubjectConfig;
use crate::models::response::ShiftId;
use crate::models::result::{normalize_roll, CandidateIdentity, CandidateRecord, ScoreSheet};
use crate::models::shift::{ShiftTable, UpsertOutcome};
use crate::services::rank_engine::RankEngine;

/// 存储错误时透明重试的次数
const STORE_RETRIES: usize = 1;

type PartitionKey = (String, ShiftId);

/// 一次写入的结果
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertReport {
    pub outcome: UpsertOutcome,
    pub rank: u32,
    pub total_candidates: usize,
}

/// 按准考证号查到的记录
#[derive(Debug, Clone, PartialEq)]
pub struct RollLookup {
    pub shift_id: ShiftId,
    pub record: CandidateRecord,
    pub total_candidates: usize,
}

/// 成绩表服务
///
/// 职责：
/// - 首次写入某场次时按当时的科目配置建表
/// - 按准考证号覆盖或追加记录
/// - 每次写入后全表重算排名，与写入一起保存
pub struct ResultStore {
    backend: Arc<dyn ShiftBackend>,
    rank_engine: RankEngine,
    partitions: Mutex<HashMap<PartitionKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResultStore {
    pub fn new(backend: Arc<dyn ShiftBackend>) -> Self {
        Self {
            backend,
            rank_engine: RankEngine::new(),
            partitions: Mutex::new(HashMap::new()),
        }
    }

    /// 以 JSON 文件保存在 `data_dir` 下
    pub fn json(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(data_dir)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    fn partition_lock(&self, exam_id: &str, shift_id: &ShiftId) -> AppResult<Arc<tokio::sync::Mutex<()>>> {
        let mut partitions = self.partitions.lock().map_err(|_| StoreError::Backend {
            message: "分区锁表已损坏".to_string(),
        })?;
        Ok(partitions
            .entry((exam_id.to_string(), shift_id.clone()))
            .or_default()
            .clone())
    }

    /// 在阻塞线程池上执行一次后端操作
    async fn run_blocking<T, F>(&self, task: F) -> AppResult<T>
    where
        F: FnOnce(&dyn ShiftBackend) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || task(backend.as_ref()))
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("存储任务中断: {}", e),
            })?
    }

    /// 写入一名考生的成绩并重算该场次排名
    ///
    /// 存储错误重试一次后仍失败则返回；配置错误（成绩表科目列与本次成绩不一致）直接返回。
    pub async fn upsert(
        &self,
        exam_id: &str,
        shift_id: &ShiftId,
        identity: CandidateIdentity,
        sheet: ScoreSheet,
        subjects: &[SubjectConfig],
    ) -> AppResult<UpsertReport> {
        let lock = self.partition_lock(exam_id, shift_id)?;
        let _guard = lock.lock().await;

        let record = CandidateRecord::new(identity, sheet);
        let mut attempt = 0;
        loop {
            let (exam, shift, record, subjects) = (
                exam_id.to_string(),
                shift_id.clone(),
                record.clone(),
                subjects.to_vec(),
            );
            let rank_engine = self.rank_engine;
            let result = self
                .run_blocking(move |backend| {
                    upsert_locked(backend, rank_engine, &exam, &shift, record, &subjects)
                })
                .await;

            match result {
                Err(e) if e.is_retryable() && attempt < STORE_RETRIES => {
                    attempt += 1;
                    warn!(
                        "[场次 {}] ⚠️ 写入成绩表失败，重试 {}/{}: {}",
                        shift_id, attempt, STORE_RETRIES, e
                    );
                }
                other => return other,
            }
        }
    }

    /// 读取整张场次成绩表
    pub async fn table(&self, exam_id: &str, shift_id: &ShiftId) -> AppResult<Option<ShiftTable>> {
        let (exam, shift) = (exam_id.to_string(), shift_id.clone());
        self.run_blocking(move |backend| Ok(backend.load(&exam, &shift)?))
            .await
    }

    /// 某场次内的全部记录（表不存在时为空）
    pub async fn all(&self, exam_id: &str, shift_id: &ShiftId) -> AppResult<Vec<CandidateRecord>> {
        Ok(self
            .table(exam_id, shift_id)
            .await?
            .map(|t| t.records)
            .unwrap_or_default())
    }

    /// 已有的场次
    pub async fn shifts(&self, exam_id: &str) -> AppResult<Vec<ShiftId>> {
        let exam = exam_id.to_string();
        self.run_blocking(move |backend| Ok(backend.list_shifts(&exam)?))
            .await
    }

    /// 在考试的所有场次中按准考证号查找
    pub async fn find_by_roll(&self, exam_id: &str, roll: &str) -> AppResult<Option<RollLookup>> {
        let (exam, roll) = (exam_id.to_string(), roll.to_string());
        self.run_blocking(move |backend| {
            for shift_id in backend.list_shifts(&exam)? {
                let Some(table) = backend.load(&exam, &shift_id)? else {
                    continue;
                };
                if let Some(record) = table.find_by_roll(&roll) {
                    return Ok(Some(RollLookup {
                        shift_id,
                        record: record.clone(),
                        total_candidates: table.len(),
                    }));
                }
            }
            Ok(None)
        })
        .await
    }

    /// 手动全表重算某场次排名（通常由 upsert 自动完成）
    pub async fn recompute_ranks(&self, exam_id: &str, shift_id: &ShiftId) -> AppResult<()> {
        let lock = self.partition_lock(exam_id, shift_id)?;
        let _guard = lock.lock().await;

        let (exam, shift) = (exam_id.to_string(), shift_id.clone());
        let rank_engine = self.rank_engine;
        self.run_blocking(move |backend| {
            if let Some(mut table) = backend.load(&exam, &shift)? {
                rank_engine.recompute(&mut table);
                backend.save(&table)?;
            }
            Ok(())
        })
        .await
    }

    /// 删除某场考试的全部成绩表
    ///
    /// 先拿到该考试所有分区的锁，等进行中的写入完成后再删除。
    /// 分区锁不从锁表中移除，之后的写入仍与等待中的写入共用同一把锁。
    pub async fn remove_exam(&self, exam_id: &str) -> AppResult<()> {
        let mut shifts = self.shifts(exam_id).await?;
        {
            let partitions = self.partitions.lock().map_err(|_| StoreError::Backend {
                message: "分区锁表已损坏".to_string(),
            })?;
            shifts.extend(
                partitions
                    .keys()
                    .filter(|(exam, _)| exam == exam_id)
                    .map(|(_, shift)| shift.clone()),
            );
        }
        shifts.sort();
        shifts.dedup();

        let mut guards = Vec::with_capacity(shifts.len());
        for shift_id in &shifts {
            let lock = self.partition_lock(exam_id, shift_id)?;
            guards.push(lock.lock_owned().await);
        }

        let exam = exam_id.to_string();
        self.run_blocking(move |backend| Ok(backend.remove_exam(&exam)?))
            .await?;
        debug!("已删除 {} 的 {} 个场次成绩表", exam_id, shifts.len());
        Ok(())
    }
}

/// 持有分区锁时执行的读-改-写
fn upsert_locked(
    backend: &dyn ShiftBackend,
    rank_engine: RankEngine,
    exam_id: &str,
    shift_id: &ShiftId,
    record: CandidateRecord,
    subjects: &[SubjectConfig],
) -> AppResult<UpsertReport> {
    let mut table = match backend.load(exam_id, shift_id)? {
        Some(table) => table,
        None => {
            info!("[场次 {}] 📄 新建成绩表 ({})", shift_id, exam_id);
            ShiftTable::create(exam_id, shift_id.clone(), subjects)
        }
    };

    if !table.schema.accepts(&record.per_subject) {
        return Err(ConfigError::SchemaMismatch {
            shift_id: shift_id.to_string(),
        }
        .into());
    }

    let roll = normalize_roll(record.roll()).to_string();
    let outcome = table.upsert(record);
    rank_engine.recompute(&mut table);

    let rank = table
        .find_by_roll(&roll)
        .and_then(|r| r.rank)
        .ok_or_else(|| AppError::Other(format!("写入后找不到准考证号 {}", roll)))?;
    let total_candidates = table.len();

    backend.save(&table)?;

    debug!(
        "[场次 {}] {:?} 准考证号 {} → 名次 {}/{}",
        shift_id, outcome, roll, rank, total_candidates
    );

    Ok(UpsertReport {
        outcome,
        rank,
        total_candidates,
    })
}
