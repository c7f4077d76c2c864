//! 单份提交处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **调用流程**：委托 `SubmissionFlow` 完成解析 → 评分 → 写入
//! 2. **错误分级**：解析 / 配置错误记为拒绝，存储错误记为故障
//! 3. **文件清理**：按配置删除已处理的提交清单

use std::path::Path;

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::models::submission::Submission;
use crate::workflow::{ProcessResult, SubmissionCtx, SubmissionFlow};

/// 单份提交的最终状态
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
    /// 已写入成绩表
    Saved(ProcessResult),
    /// 文档或配置问题，未写入
    Rejected(String),
    /// 存储或读取故障
    Failed(String),
}

/// 处理单份提交
pub async fn process_submission(
    flow: &SubmissionFlow,
    submission: &Submission,
    submission_index: usize,
    remove_processed: bool,
) -> SubmissionStatus {
    let ctx = SubmissionCtx::new(
        submission.exam_name.clone(),
        submission_index,
        submission.label(),
    );
    info!("{} 开始处理: {} ({})", ctx, ctx.label, ctx.exam_name);

    match flow.run(&ctx, submission).await {
        Ok(result) => {
            if remove_processed {
                cleanup_file(submission.file_path.as_deref(), &ctx);
            }
            SubmissionStatus::Saved(result)
        }
        Err(e @ (AppError::Parse(_) | AppError::Config(_))) => {
            warn!("{} ⚠️ 提交被拒绝: {}", ctx, e);
            SubmissionStatus::Rejected(e.to_string())
        }
        Err(e) => {
            error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
            SubmissionStatus::Failed(e.to_string())
        }
    }
}

/// 删除已处理的提交清单
fn cleanup_file(file_path: Option<&Path>, ctx: &SubmissionCtx) {
    let Some(path) = file_path else {
        return;
    };
    match std::fs::remove_file(path) {
        Ok(()) => info!("{} 🗑️ 已删除提交清单: {}", ctx, path.display()),
        Err(e) => warn!("{} 删除提交清单失败 {}: {}", ctx, path.display(), e),
    }
}
