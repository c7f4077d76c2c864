//! 场次成绩表存储后端 - 基础设施层
//!
//! 只负责整表的读取与原子写入，不做并发控制和业务判断。
//! 一次 `save` 要么完整替换旧表，要么保持旧表不变。

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::StoreError;
use crate::models::response::ShiftId;
use crate::models::shift::ShiftTable;

/// 成绩表文件名前缀
pub const SHIFT_FILE_PREFIX: &str = "responses_";

/// 场次成绩表存储后端
pub trait ShiftBackend: Send + Sync {
    /// 读取整表，不存在时返回 `None`
    fn load(&self, exam_id: &str, shift_id: &ShiftId) -> Result<Option<ShiftTable>, StoreError>;

    /// 原子地替换整表
    fn save(&self, table: &ShiftTable) -> Result<(), StoreError>;

    /// 某场考试已有的场次（按标识排序）
    fn list_shifts(&self, exam_id: &str) -> Result<Vec<ShiftId>, StoreError>;

    /// 删除某场考试的所有成绩表
    fn remove_exam(&self, exam_id: &str) -> Result<(), StoreError>;
}

/// 持久化格式：表头 + 结构化记录
#[derive(serde::Serialize)]
struct TableFileRef<'a> {
    columns: Vec<String>,
    #[serde(flatten)]
    table: &'a ShiftTable,
}

#[derive(serde::Deserialize)]
struct TableFile {
    #[serde(flatten)]
    table: ShiftTable,
}

/// JSON 文件后端：`<root>/<exam_id>/responses_<shift_id>.json`
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn table_path(&self, exam_id: &str, shift_id: &ShiftId) -> PathBuf {
        self.root
            .join(exam_id)
            .join(format!("{}{}.json", SHIFT_FILE_PREFIX, shift_id))
    }
}

impl ShiftBackend for JsonFileBackend {
    fn load(&self, exam_id: &str, shift_id: &ShiftId) -> Result<Option<ShiftTable>, StoreError> {
        let path = self.table_path(exam_id, shift_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path.display().to_string(), e)),
        };

        let file: TableFile = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(file.table))
    }

    fn save(&self, table: &ShiftTable) -> Result<(), StoreError> {
        let path = self.table_path(&table.exam_id, &table.shift_id);
        let shown = path.display().to_string();
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(&shown, e))?;

        let file = TableFileRef {
            columns: table.columns(),
            table,
        };
        let content = serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Corrupt {
            path: shown.clone(),
            source: e,
        })?;

        // 同目录临时文件 + rename，读者只会看到旧表或新表
        let mut temp_file =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(&shown, e))?;
        temp_file
            .write_all(&content)
            .map_err(|e| StoreError::io(&shown, e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&shown, e))?;
        temp_file
            .persist(&path)
            .map_err(|e| StoreError::io(&shown, e.error))?;

        debug!("成绩表已写入: {} ({} 条记录)", shown, table.len());
        Ok(())
    }

    fn list_shifts(&self, exam_id: &str) -> Result<Vec<ShiftId>, StoreError> {
        let dir = self.root.join(exam_id);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir.display().to_string(), e)),
        };

        let mut shifts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir.display().to_string(), e))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(shift) = file_name
                .strip_prefix(SHIFT_FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                shifts.push(ShiftId::from_normalized(shift));
            }
        }
        shifts.sort();
        Ok(shifts)
    }

    fn remove_exam(&self, exam_id: &str) -> Result<(), StoreError> {
        for shift in self.list_shifts(exam_id)? {
            let path = self.table_path(exam_id, &shift);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(path.display().to_string(), e)),
            }
        }
        Ok(())
    }
}

/// 内存后端（测试与嵌入使用）
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<BTreeMap<(String, ShiftId), ShiftTable>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<(String, ShiftId), ShiftTable>>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Backend {
            message: "内存成绩表锁已损坏".to_string(),
        })
    }
}

impl ShiftBackend for MemoryBackend {
    fn load(&self, exam_id: &str, shift_id: &ShiftId) -> Result<Option<ShiftTable>, StoreError> {
        Ok(self
            .lock()?
            .get(&(exam_id.to_string(), shift_id.clone()))
            .cloned())
    }

    fn save(&self, table: &ShiftTable) -> Result<(), StoreError> {
        self.lock()?.insert(
            (table.exam_id.clone(), table.shift_id.clone()),
            table.clone(),
        );
        Ok(())
    }

    fn list_shifts(&self, exam_id: &str) -> Result<Vec<ShiftId>, StoreError> {
        Ok(self
            .lock()?
            .keys()
            .filter(|(exam, _)| exam == exam_id)
            .map(|(_, shift)| shift.clone())
            .collect())
    }

    fn remove_exam(&self, exam_id: &str) -> Result<(), StoreError> {
        self.lock()?.retain(|(exam, _), _| exam != exam_id);
        Ok(())
    }
}
