use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::exam::{exam_id, ExamConfig};
use crate::models::submission::Submission;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 考试配置文件名
pub const EXAM_CONFIG_FILE: &str = "exam.toml";

/// 考试目录：`<data_dir>/<exam_id>`
pub fn exam_dir(data_dir: &Path, exam_name: &str) -> PathBuf {
    data_dir.join(exam_id(exam_name))
}

/// 考试配置路径：`<data_dir>/<exam_id>/exam.toml`
pub fn exam_config_path(data_dir: &Path, exam_name: &str) -> PathBuf {
    exam_dir(data_dir, exam_name).join(EXAM_CONFIG_FILE)
}

/// 加载考试的评分方案与科目列表
///
/// 文件不存在时返回 `ConfigError::ExamNotFound`，科目为空或重名时返回对应的配置错误。
pub async fn load_exam_config(data_dir: &Path, exam_name: &str) -> AppResult<ExamConfig> {
    let path = exam_config_path(data_dir, exam_name);

    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ExamNotFound {
                exam: exam_name.to_string(),
            }
            .into());
        }
        Err(e) => return Err(AppError::file_read_failed(path.display().to_string(), e)),
    };

    let config: ExamConfig = toml::from_str(&content)
        .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))?;
    config.validate()?;

    tracing::debug!(
        "已加载考试配置: {} ({} 个科目)",
        config.exam_name(),
        config.subjects.len()
    );

    Ok(config)
}

/// 从 TOML 文件加载提交清单
pub async fn load_submission(path: &Path) -> AppResult<Submission> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let submission: Submission = toml::from_str(&content)
        .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))?;

    Ok(submission.with_file_path(path.to_path_buf()))
}

/// 从文件夹中加载所有提交清单（按文件名排序）
///
/// 单个清单解析失败只记录警告，不影响其他清单。
pub async fn load_all_submissions(folder_path: &str) -> AppResult<Vec<Submission>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::NotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut manifest_paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            manifest_paths.push(path);
        }
    }
    manifest_paths.sort();

    let mut submissions = Vec::with_capacity(manifest_paths.len());
    for path in manifest_paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission(&path).await {
            Ok(submission) => submissions.push(submission),
            Err(e) => {
                tracing::warn!("加载提交清单失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
