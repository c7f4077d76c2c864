use serde::{Deserialize, Serialize};

/// 单科成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub name: String,
    /// 作答题数 = r + w
    pub attempt: u32,
    pub r: u32,
    pub w: u32,
    pub na: u32,
    /// 不做取整，取整属于展示层
    pub marks: f64,
    pub count_in_total: bool,
}

/// 评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
    pub subjects: Vec<SubjectResult>,
    pub final_marks: f64,
}

/// 考生身份信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentity {
    pub name: String,
    pub roll: String,
    pub category: String,
    pub gender: String,
    pub state: String,
}

/// 场次成绩表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(flatten)]
    pub identity: CandidateIdentity,
    pub final_marks: f64,
    pub per_subject: Vec<SubjectResult>,
    /// 仅在完整写入后由排名引擎赋值
    #[serde(default)]
    pub rank: Option<u32>,
}

impl CandidateRecord {
    pub fn new(identity: CandidateIdentity, sheet: ScoreSheet) -> Self {
        Self {
            identity,
            final_marks: sheet.final_marks,
            per_subject: sheet.subjects,
            rank: None,
        }
    }

    pub fn roll(&self) -> &str {
        &self.identity.roll
    }

    /// 由单科成绩重新计算总分
    pub fn recomputed_final(&self) -> f64 {
        self.per_subject
            .iter()
            .filter(|s| s.count_in_total)
            .map(|s| s.marks)
            .sum()
    }

    /// 计入总分的科目
    pub fn counted(&self) -> impl Iterator<Item = &SubjectResult> {
        self.per_subject.iter().filter(|s| s.count_in_total)
    }

    /// 资格性科目
    pub fn qualifying(&self) -> impl Iterator<Item = &SubjectResult> {
        self.per_subject.iter().filter(|s| !s.count_in_total)
    }
}

/// 准考证号按去除首尾空白后的字符串比较
pub fn normalize_roll(roll: &str) -> &str {
    roll.trim()
}
