//! 成绩查询服务 - 业务能力层
//!
//! 对外的只读接口：按 (考试, 准考证号) 取回考生成绩单，供报表渲染使用。

use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

use crate::error::{AppResult, LookupError};
use crate::models::exam::exam_id;
use crate::models::response::ShiftId;
use crate::models::result::SubjectResult;
use crate::services::result_store::ResultStore;

/// 成绩单上的考生信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub name: String,
    pub roll: String,
    pub category: String,
    pub gender: String,
    pub state: String,
    pub rank: Option<u32>,
}

/// 成绩单
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub exam: String,
    pub shift_id: ShiftId,
    pub candidate: CandidateSummary,
    pub total_candidates: usize,
    /// 计入总分的科目
    pub counted_subjects: Vec<SubjectResult>,
    /// 资格性科目
    pub qualifying_subjects: Vec<SubjectResult>,
    pub final_marks: f64,
}

pub struct ResultQuery {
    store: Arc<ResultStore>,
}

impl ResultQuery {
    pub fn new(store: Arc<ResultStore>) -> Self {
        Self { store }
    }

    /// 在考试的所有场次中查找考生；找不到时返回 `LookupError::RollNotFound`
    pub async fn result(&self, exam_name: &str, roll: &str) -> AppResult<ResultView> {
        let lookup = self
            .store
            .find_by_roll(&exam_id(exam_name), roll)
            .await?
            .ok_or_else(|| LookupError::RollNotFound {
                exam: exam_name.to_string(),
                roll: roll.to_string(),
            })?;

        let record = lookup.record;
        Ok(ResultView {
            exam: exam_name.to_string(),
            shift_id: lookup.shift_id,
            counted_subjects: record.counted().cloned().collect(),
            qualifying_subjects: record.qualifying().cloned().collect(),
            final_marks: record.final_marks,
            total_candidates: lookup.total_candidates,
            candidate: CandidateSummary {
                name: record.identity.name,
                roll: record.identity.roll,
                category: record.identity.category,
                gender: record.identity.gender,
                state: record.identity.state,
                rank: record.rank,
            },
        })
    }
}

/// 纯文本成绩单
impl Display for ResultView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.exam)?;
        writeln!(f, "Name: {}", self.candidate.name)?;
        writeln!(f, "Roll No: {}", self.candidate.roll)?;
        writeln!(f, "Category: {}", self.candidate.category)?;
        writeln!(f, "State: {}", self.candidate.state)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<16}{:>8}{:>6}{:>6}{:>6}{:>9}",
            "Subject", "Attempt", "NA", "R", "W", "Marks"
        )?;
        for subject in self.counted_subjects.iter().chain(&self.qualifying_subjects) {
            writeln!(
                f,
                "{:<16}{:>8}{:>6}{:>6}{:>6}{:>9.2}",
                subject.name, subject.attempt, subject.na, subject.r, subject.w, subject.marks
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Final Marks: {:.2}", self.final_marks)?;
        let rank = self
            .candidate
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(f, "Shift Rank: {} / {}", rank, self.total_candidates)
    }
}
