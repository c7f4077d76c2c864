//! 场次成绩表
//!
//! 一场考试的每个场次对应一张表，以准考证号为键。
//! 表的科目列在创建时由当时的科目配置确定，之后不再重新推导。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::exam::SubjectConfig;
use crate::models::response::ShiftId;
use crate::models::result::{normalize_roll, CandidateRecord, SubjectResult};

/// 固定的身份列
pub const IDENTITY_COLUMNS: [&str; 6] = ["Name", "Roll", "Category", "Gender", "State", "FinalMarks"];

/// 每个科目展开的列后缀
pub const SUBJECT_COLUMN_SUFFIXES: [&str; 5] = ["Attempt", "R", "W", "NA", "Marks"];

/// 科目列定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectColumn {
    pub name: String,
    pub count_in_total: bool,
}

/// 成绩表结构（由科目配置生成一次）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchema {
    pub subjects: Vec<SubjectColumn>,
}

impl ShiftSchema {
    pub fn from_subjects(subjects: &[SubjectConfig]) -> Self {
        Self {
            subjects: subjects
                .iter()
                .map(|s| SubjectColumn {
                    name: s.name.clone(),
                    count_in_total: s.count_in_total,
                })
                .collect(),
        }
    }

    /// 表头：Name, Roll, ..., {Subject}_Attempt, ..., Rank
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
        for subject in &self.subjects {
            for suffix in SUBJECT_COLUMN_SUFFIXES {
                columns.push(format!("{}_{}", subject.name, suffix));
            }
        }
        columns.push("Rank".to_string());
        columns
    }

    /// 单科成绩是否与表结构一一对应
    pub fn accepts(&self, results: &[SubjectResult]) -> bool {
        self.subjects.len() == results.len()
            && self
                .subjects
                .iter()
                .zip(results)
                .all(|(column, result)| column.name == result.name)
    }
}

/// 场次成绩表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTable {
    pub exam_id: String,
    pub shift_id: ShiftId,
    pub schema: ShiftSchema,
    pub created_at: DateTime<Utc>,
    pub records: Vec<CandidateRecord>,
}

/// 写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl ShiftTable {
    /// 新建空表，科目列取自当前配置
    pub fn create(exam_id: impl Into<String>, shift_id: ShiftId, subjects: &[SubjectConfig]) -> Self {
        Self {
            exam_id: exam_id.into(),
            shift_id,
            schema: ShiftSchema::from_subjects(subjects),
            created_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_roll(&self, roll: &str) -> Option<&CandidateRecord> {
        let roll = normalize_roll(roll);
        self.records
            .iter()
            .find(|r| normalize_roll(r.roll()) == roll)
    }

    /// 按准考证号覆盖整行或追加新行
    ///
    /// 重复提交时身份信息和单科成绩一起覆盖，排名清空等待重算。
    pub fn upsert(&mut self, mut record: CandidateRecord) -> UpsertOutcome {
        let roll = normalize_roll(record.roll()).to_string();
        record.identity.roll = roll.clone();
        match self
            .records
            .iter_mut()
            .find(|r| normalize_roll(r.roll()) == roll)
        {
            Some(existing) => {
                *existing = record;
                existing.rank = None;
                UpsertOutcome::Updated
            }
            None => {
                self.records.push(record);
                UpsertOutcome::Inserted
            }
        }
    }

    pub fn columns(&self) -> Vec<String> {
        self.schema.columns()
    }

    /// 按表头顺序输出字符串行
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|record| {
                let id = &record.identity;
                let mut row = vec![
                    id.name.clone(),
                    id.roll.clone(),
                    id.category.clone(),
                    id.gender.clone(),
                    id.state.clone(),
                    record.final_marks.to_string(),
                ];
                for subject in &record.per_subject {
                    row.push(subject.attempt.to_string());
                    row.push(subject.r.to_string());
                    row.push(subject.w.to_string());
                    row.push(subject.na.to_string());
                    row.push(subject.marks.to_string());
                }
                row.push(record.rank.map(|r| r.to_string()).unwrap_or_default());
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{CandidateIdentity, ScoreSheet};

    fn subjects() -> Vec<SubjectConfig> {
        vec![
            SubjectConfig::new("Reasoning", 50.0, true),
            SubjectConfig::new("Computer", 20.0, false),
        ]
    }

    fn record(roll: &str, final_marks: f64) -> CandidateRecord {
        let identity = CandidateIdentity {
            name: "Asha".to_string(),
            roll: roll.to_string(),
            category: "GEN".to_string(),
            gender: "F".to_string(),
            state: "Delhi".to_string(),
        };
        let sheet = ScoreSheet {
            subjects: vec![
                SubjectResult {
                    name: "Reasoning".to_string(),
                    attempt: 3,
                    r: 2,
                    w: 1,
                    na: 1,
                    marks: final_marks,
                    count_in_total: true,
                },
                SubjectResult {
                    name: "Computer".to_string(),
                    attempt: 0,
                    r: 0,
                    w: 0,
                    na: 4,
                    marks: 0.0,
                    count_in_total: false,
                },
            ],
            final_marks,
        };
        CandidateRecord::new(identity, sheet)
    }

    #[test]
    fn columns_follow_subject_order() {
        let schema = ShiftSchema::from_subjects(&subjects());
        let columns = schema.columns();
        assert_eq!(columns.len(), 6 + 2 * 5 + 1);
        assert_eq!(&columns[..6], &IDENTITY_COLUMNS.map(String::from));
        assert_eq!(columns[6], "Reasoning_Attempt");
        assert_eq!(columns[10], "Reasoning_Marks");
        assert_eq!(columns[11], "Computer_Attempt");
        assert_eq!(columns.last().map(String::as_str), Some("Rank"));
    }

    #[test]
    fn upsert_matches_trimmed_roll() {
        let mut table = ShiftTable::create("SSC_CGL", ShiftId::from_normalized("s1"), &subjects());
        assert_eq!(table.upsert(record("2401", 7.0)), UpsertOutcome::Inserted);
        assert_eq!(table.upsert(record(" 2401 ", 9.0)), UpsertOutcome::Updated);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].final_marks, 9.0);
        assert_eq!(table.records[0].roll(), "2401");
    }

    #[test]
    fn stored_roll_is_trimmed() {
        let mut table = ShiftTable::create("SSC_CGL", ShiftId::from_normalized("s1"), &subjects());
        table.upsert(record("  2402\t", 5.0));
        assert_eq!(table.records[0].roll(), "2402");
        assert_eq!(table.rows()[0][1], "2402");
    }

    #[test]
    fn rows_line_up_with_columns() {
        let mut table = ShiftTable::create("SSC_CGL", ShiftId::from_normalized("s1"), &subjects());
        table.upsert(record("2401", 7.0));
        table.records[0].rank = Some(1);
        let rows = table.rows();
        assert_eq!(rows[0].len(), table.columns().len());
        assert_eq!(rows[0][1], "2401");
        assert_eq!(rows[0][5], "7");
        assert_eq!(rows[0].last().map(String::as_str), Some("1"));
    }

    #[test]
    fn schema_rejects_renamed_subjects() {
        let schema = ShiftSchema::from_subjects(&subjects());
        let mut results = record("1", 1.0).per_subject;
        assert!(schema.accepts(&results));
        results[1].name = "GK".to_string();
        assert!(!schema.accepts(&results));
    }
}
