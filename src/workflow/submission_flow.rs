//! 提交处理流程 - 流程层
//!
//! 核心职责：定义"一份答题卡"的完整处理流程
//!
//! 流程顺序：
//! 1. 加载考试配置（评分方案 + 科目）
//! 2. 解析答题卡 → 场次、姓名、准考证号、分区统计
//! 3. 评分 → 单科成绩与总分
//! 4. 写入场次成绩表并重算排名
//!
//! 第 1~3 步的任何错误都发生在写入之前，成绩表不会被改动。

use std::sync::Arc;

use tracing::info;

use crate::error::{AppResult, ConfigError};
use crate::infrastructure::DocumentReader;
use crate::models::exam::exam_id;
use crate::models::response::ShiftId;
use crate::models::result::CandidateIdentity;
use crate::models::shift::UpsertOutcome;
use crate::models::submission::{DocumentSource, Submission};
use crate::services::{ExamCatalog, ResponseParser, ResultStore, Scorer};
use crate::workflow::submission_ctx::SubmissionCtx;

/// 表单中填写的考生信息（答题卡中没有）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demographics {
    pub category: String,
    pub gender: String,
    pub state: String,
}

impl From<&Submission> for Demographics {
    fn from(submission: &Submission) -> Self {
        Self {
            category: submission.category.clone(),
            gender: submission.gender.clone(),
            state: submission.state.clone(),
        }
    }
}

/// 提交处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub roll: String,
    pub shift_id: ShiftId,
    pub outcome: UpsertOutcome,
    pub final_marks: f64,
    pub rank: u32,
    pub total_candidates: usize,
}

/// 提交处理流程
///
/// - 编排解析 → 评分 → 写入
/// - 不持有成绩表之外的共享状态
pub struct SubmissionFlow {
    catalog: Arc<ExamCatalog>,
    store: Arc<ResultStore>,
    reader: Arc<DocumentReader>,
    parser: ResponseParser,
    scorer: Scorer,
}

impl SubmissionFlow {
    pub fn new(catalog: Arc<ExamCatalog>, store: Arc<ResultStore>, reader: Arc<DocumentReader>) -> Self {
        Self {
            catalog,
            store,
            reader,
            parser: ResponseParser::new(),
            scorer: Scorer::new(),
        }
    }

    /// 处理一份提交清单
    pub async fn run(&self, ctx: &SubmissionCtx, submission: &Submission) -> AppResult<ProcessResult> {
        let source = submission
            .source()
            .ok_or_else(|| ConfigError::MissingDocument {
                submission: ctx.label.clone(),
            })?;
        let html = self.reader.read(&source).await?;

        self.evaluate(ctx, &html, Demographics::from(submission)).await
    }

    /// 处理已读入内存的答题卡
    pub async fn evaluate(
        &self,
        ctx: &SubmissionCtx,
        html: &str,
        demographics: Demographics,
    ) -> AppResult<ProcessResult> {
        let exam = self.catalog.load(&ctx.exam_name).await?;
        let parsed = self.parser.parse(html)?;

        info!(
            "{} 📄 {} ({}) | 场次 {}",
            ctx, parsed.name, parsed.roll, parsed.shift_id
        );

        let sheet = self
            .scorer
            .score(&parsed.tallies(), &exam.subjects, &exam.scheme)?;
        let final_marks = sheet.final_marks;

        let identity = CandidateIdentity {
            name: parsed.name,
            roll: parsed.roll,
            category: demographics.category,
            gender: demographics.gender,
            state: demographics.state,
        };
        let roll = identity.roll.clone();

        let report = self
            .store
            .upsert(
                &exam_id(&ctx.exam_name),
                &parsed.shift_id,
                identity,
                sheet,
                &exam.subjects,
            )
            .await?;

        info!(
            "{} ✓ 总分 {} | 名次 {}/{} ({:?})",
            ctx, final_marks, report.rank, report.total_candidates, report.outcome
        );

        Ok(ProcessResult {
            roll,
            shift_id: parsed.shift_id,
            outcome: report.outcome,
            final_marks,
            rank: report.rank,
            total_candidates: report.total_candidates,
        })
    }

    /// 直接按来源处理（不经过清单文件）
    pub async fn run_source(
        &self,
        ctx: &SubmissionCtx,
        source: &DocumentSource,
        demographics: Demographics,
    ) -> AppResult<ProcessResult> {
        let html = self.reader.read(source).await?;
        self.evaluate(ctx, &html, demographics).await
    }
}
