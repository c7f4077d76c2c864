//! 考试目录服务 - 业务能力层
//!
//! 管理 `<data_dir>/<exam_id>/exam.toml`：新建、列出、删除、加载考试配置。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::exam::ExamConfig;
use crate::models::loaders::{exam_config_path, exam_dir, load_exam_config, EXAM_CONFIG_FILE};
use crate::services::result_store::ResultStore;

pub struct ExamCatalog {
    data_dir: PathBuf,
}

impl ExamCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 加载评分方案与科目列表
    pub async fn load(&self, exam_name: &str) -> AppResult<ExamConfig> {
        load_exam_config(&self.data_dir, exam_name).await
    }

    /// 写入考试配置（已存在时覆盖评分方案和科目，已有成绩表的科目列保持不变）
    pub async fn create(&self, config: &ExamConfig) -> AppResult<()> {
        config.validate()?;

        let dir = exam_dir(&self.data_dir, config.exam_name());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;

        let path = dir.join(EXAM_CONFIG_FILE);
        let content = toml::to_string(config)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        fs::write(&path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!(
            "✓ 考试已保存: {} ({} 个科目)",
            config.exam_name(),
            config.subjects.len()
        );
        Ok(())
    }

    /// 所有可读取的考试配置（按考试名称排序）
    pub async fn list(&self) -> AppResult<Vec<ExamConfig>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut exams = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .map_err(|e| AppError::file_read_failed(self.data_dir.display().to_string(), e))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path().join(EXAM_CONFIG_FILE);
            if !path.exists() {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("读取考试配置失败 {}: {}", path.display(), e);
                    continue;
                }
            };
            match toml::from_str::<ExamConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => exams.push(config),
                    Err(e) => warn!("考试配置无效，已跳过 {}: {}", path.display(), e),
                },
                Err(e) => warn!("解析考试配置失败 {}: {}", path.display(), e),
            }
        }

        exams.sort_by(|a, b| a.exam_name().cmp(b.exam_name()));
        Ok(exams)
    }

    /// 删除考试目录及其全部场次成绩表
    pub async fn delete(&self, exam_name: &str, store: &Arc<ResultStore>) -> AppResult<()> {
        if !exam_config_path(&self.data_dir, exam_name).exists() {
            return Err(ConfigError::ExamNotFound {
                exam: exam_name.to_string(),
            }
            .into());
        }

        let exam = crate::models::exam::exam_id(exam_name);
        store.remove_exam(&exam).await?;

        let dir = exam_dir(&self.data_dir, exam_name);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;
        }

        info!("🗑️ 考试已删除: {}", exam_name);
        Ok(())
    }
}
