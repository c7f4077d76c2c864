//! 考试配置：评分方案 + 有序科目列表

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AppResult, ConfigError};

/// 评分方案（每场考试固定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingScheme {
    pub exam_name: String,
    /// 答对得分
    pub correct: f64,
    /// 答错得分（通常为负数，例如 -0.25）
    pub wrong: f64,
    /// 未作答得分
    pub na: f64,
}

/// 科目配置
///
/// 顺序与答题卡中的分区一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub name: String,
    #[serde(default)]
    pub max_marks: f64,
    /// 是否计入总分（否则为资格性科目）
    #[serde(default = "default_count_in_total")]
    pub count_in_total: bool,
}

fn default_count_in_total() -> bool {
    true
}

impl SubjectConfig {
    pub fn new(name: impl Into<String>, max_marks: f64, count_in_total: bool) -> Self {
        Self {
            name: name.into(),
            max_marks,
            count_in_total,
        }
    }
}

/// exam.toml 的完整内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(flatten)]
    pub scheme: MarkingScheme,
    #[serde(default)]
    pub subjects: Vec<SubjectConfig>,
}

impl ExamConfig {
    pub fn new(scheme: MarkingScheme, subjects: Vec<SubjectConfig>) -> Self {
        Self { scheme, subjects }
    }

    pub fn exam_name(&self) -> &str {
        &self.scheme.exam_name
    }

    /// 考试在存储中的标识（空格替换为下划线）
    pub fn exam_id(&self) -> String {
        exam_id(&self.scheme.exam_name)
    }

    /// 至少一个科目，且科目名称唯一
    pub fn validate(&self) -> AppResult<()> {
        if self.subjects.is_empty() {
            return Err(ConfigError::NoSubjects {
                exam: self.scheme.exam_name.clone(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for subject in &self.subjects {
            if !seen.insert(subject.name.as_str()) {
                return Err(ConfigError::DuplicateSubject {
                    exam: self.scheme.exam_name.clone(),
                    subject: subject.name.clone(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 由考试名称得到存储标识
pub fn exam_id(exam_name: &str) -> String {
    exam_name.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> MarkingScheme {
        MarkingScheme {
            exam_name: "SSC CGL".to_string(),
            correct: 2.0,
            wrong: -0.5,
            na: 0.0,
        }
    }

    #[test]
    fn exam_id_replaces_spaces() {
        assert_eq!(exam_id("SSC CGL Tier 1"), "SSC_CGL_Tier_1");
    }

    #[test]
    fn rejects_duplicate_subjects() {
        let config = ExamConfig::new(
            scheme(),
            vec![
                SubjectConfig::new("Reasoning", 50.0, true),
                SubjectConfig::new("Reasoning", 50.0, true),
            ],
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            crate::AppError::Config(ConfigError::DuplicateSubject { .. })
        ));
    }

    #[test]
    fn rejects_empty_subject_list() {
        let config = ExamConfig::new(scheme(), Vec::new());
        assert!(matches!(
            config.validate(),
            Err(crate::AppError::Config(ConfigError::NoSubjects { .. }))
        ));
    }

    #[test]
    fn parses_toml_layout() {
        let raw = r#"
exam_name = "SSC CGL"
correct = 2.0
wrong = -0.5
na = 0

[[subjects]]
name = "Reasoning"
max_marks = 50
count_in_total = true

[[subjects]]
name = "Computer"
max_marks = 20
count_in_total = false
"#;
        let config: ExamConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.scheme, scheme());
        assert_eq!(config.subjects.len(), 2);
        assert!(!config.subjects[1].count_in_total);
        assert_eq!(config.subjects[1].max_marks, 20.0);
    }
}
