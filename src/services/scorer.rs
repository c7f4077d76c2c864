//! 评分服务 - 业务能力层
//!
//! 纯函数：分区统计 + 科目配置 + 评分方案 → 单科成绩与总分

use crate::error::{AppResult, ConfigError};
use crate::models::exam::{MarkingScheme, SubjectConfig};
use crate::models::response::SectionTally;
use crate::models::result::{ScoreSheet, SubjectResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct Scorer;

impl Scorer {
    pub fn new() -> Self {
        Self
    }

    /// 分区与科目按位置一一对应，数量不一致时返回 `ConfigError::SubjectCountMismatch`
    pub fn score(
        &self,
        tallies: &[SectionTally],
        subjects: &[SubjectConfig],
        scheme: &MarkingScheme,
    ) -> AppResult<ScoreSheet> {
        if tallies.len() != subjects.len() {
            return Err(ConfigError::SubjectCountMismatch {
                sections: tallies.len(),
                subjects: subjects.len(),
            }
            .into());
        }

        let results: Vec<SubjectResult> = tallies
            .iter()
            .zip(subjects)
            .map(|(tally, subject)| subject_result(tally, subject, scheme))
            .collect();

        let final_marks = results
            .iter()
            .filter(|r| r.count_in_total)
            .map(|r| r.marks)
            .fold(0.0, |total, marks| total + marks);

        Ok(ScoreSheet {
            subjects: results,
            final_marks,
        })
    }
}

fn subject_result(tally: &SectionTally, subject: &SubjectConfig, scheme: &MarkingScheme) -> SubjectResult {
    let marks = f64::from(tally.correct) * scheme.correct
        + f64::from(tally.wrong) * scheme.wrong
        + f64::from(tally.unattempted) * scheme.na;

    SubjectResult {
        name: subject.name.clone(),
        attempt: tally.correct + tally.wrong,
        r: tally.correct,
        w: tally.wrong,
        na: tally.unattempted,
        marks,
        count_in_total: subject.count_in_total,
    }
}
