#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rankpred::models::{CandidateIdentity, ScoreSheet, SubjectResult};
use rankpred::{ExamConfig, MarkingScheme, SubjectConfig};

pub const SAMPLE_EXAM: &str = "SSC CGL 2024";

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("读取测试文件失败")
}

/// 两个科目：推理（计分）+ 计算机（资格性）；对 +3 / 错 -1 / 未答 0
pub fn sample_exam() -> ExamConfig {
    ExamConfig::new(
        MarkingScheme {
            exam_name: SAMPLE_EXAM.to_string(),
            correct: 3.0,
            wrong: -1.0,
            na: 0.0,
        },
        vec![
            SubjectConfig::new("General Intelligence and Reasoning", 15.0, true),
            SubjectConfig::new("Computer Knowledge", 9.0, false),
        ],
    )
}

/// 生成一份答题卡：`sections` 为 (分区名, [(所选选项, 正确选项)])
pub fn response_html(
    name: &str,
    roll: &str,
    date: &str,
    window: &str,
    sections: &[(&str, &[(&str, u32)])],
) -> String {
    let mut body = String::new();
    for (label, questions) in sections {
        body.push_str(&format!(
            r#"<div class="section-cntnr"><div class="section-lbl"><span class="bold">{label}</span></div>"#
        ));
        for (chosen, right) in questions.iter() {
            body.push_str(&format!(
                r#"<div class="question-pnl"><table><tr>
                  <td><table class="questionRowTbl"><tr><td class="rightAns">{right}. Option</td></tr></table></td>
                  <td><table class="menu-tbl"><tr><td>Chosen Option :</td><td class="bold">{chosen}</td></tr></table></td>
                </tr></table></div>"#
            ));
        }
        body.push_str("</div>");
    }

    format!(
        r#"<html><body>
        <div class="main-info-pnl"><table>
          <tr><td>Candidate Name</td><td>{name}</td></tr>
          <tr><td>Roll No.</td><td>{roll}</td></tr>
          <tr><td>Test Date</td><td>{date}</td></tr>
          <tr><td>Test Time</td><td>{window}</td></tr>
        </table></div>
        {body}
        </body></html>"#
    )
}

/// 指定推理分区答对题数（计算机分区固定全对 1 题）的答题卡
pub fn reasoning_sheet(name: &str, roll: &str, correct: usize, wrong: usize) -> String {
    let mut reasoning: Vec<(&str, u32)> = Vec::new();
    reasoning.extend(std::iter::repeat(("1", 1)).take(correct));
    reasoning.extend(std::iter::repeat(("2", 1)).take(wrong));
    response_html(
        name,
        roll,
        "21/04/2024",
        "9:00 AM - 10:00 AM",
        &[
            ("General Intelligence and Reasoning", reasoning.as_slice()),
            ("Computer Knowledge", [("1", 1)].as_slice()),
        ],
    )
}

pub fn identity(name: &str, roll: &str) -> CandidateIdentity {
    CandidateIdentity {
        name: name.to_string(),
        roll: roll.to_string(),
        category: "GEN".to_string(),
        gender: "F".to_string(),
        state: "Delhi".to_string(),
    }
}

/// 单科计分的成绩单
pub fn single_subject_sheet(marks: f64) -> ScoreSheet {
    ScoreSheet {
        subjects: vec![SubjectResult {
            name: "Reasoning".to_string(),
            attempt: 0,
            r: 0,
            w: 0,
            na: 0,
            marks,
            count_in_total: true,
        }],
        final_marks: marks,
    }
}

pub fn single_subject() -> Vec<SubjectConfig> {
    vec![SubjectConfig::new("Reasoning", 50.0, true)]
}
