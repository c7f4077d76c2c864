//! 提交处理上下文
//!
//! 封装"我正在处理第几份提交、属于哪场考试"这一信息

use std::fmt::Display;

/// 提交处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 考试名称
    pub exam_name: String,

    /// 提交索引（仅用于日志显示，从1开始）
    pub submission_index: usize,

    /// 清单文件名或来源描述
    pub label: String,
}

impl SubmissionCtx {
    pub fn new(exam_name: String, submission_index: usize, label: String) -> Self {
        Self {
            exam_name,
            submission_index,
            label,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[提交 {}]", self.submission_index)
    }
}
