use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::OnceLock;

/// 单个分区的作答统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTally {
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
}

impl SectionTally {
    pub fn new(correct: u32, wrong: u32, unattempted: u32) -> Self {
        Self {
            correct,
            wrong,
            unattempted,
        }
    }

    pub fn questions(&self) -> u32 {
        self.correct + self.wrong + self.unattempted
    }
}

/// 单题判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
    Unattempted,
}

impl SectionTally {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Wrong => self.wrong += 1,
            Verdict::Unattempted => self.unattempted += 1,
        }
    }
}

/// 场次标识：规范化日期 + "_" + 规范化时间段
///
/// 例如 `21/04/2024` + `9:00 AM - 10:00 AM` → `21-04-2024_9-00AM-10-00AM`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(String);

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

impl ShiftId {
    pub fn from_tokens(date: &str, time_window: &str) -> Self {
        let date_part = date.replace('/', "-");
        let time_part = time_window.replace(':', "-");
        let time_part = whitespace_re().replace_all(&time_part, "");
        Self(format!("{}_{}", date_part, time_part))
    }

    /// 已规范化的标识（例如从存储中读出）
    pub fn from_normalized(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 答题卡解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub name: String,
    pub roll: String,
    pub shift_id: ShiftId,
    /// 按首次出现顺序排列的 (分区名, 统计)
    pub sections: Vec<(String, SectionTally)>,
}

impl ParsedResponse {
    pub fn tallies(&self) -> Vec<SectionTally> {
        self.sections.iter().map(|(_, tally)| *tally).collect()
    }
}
