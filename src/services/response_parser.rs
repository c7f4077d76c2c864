//! 答题卡解析服务 - 业务能力层
//!
//! 只负责"读懂一份答题卡"：场次、考生姓名与准考证号、各分区的对错统计。
//! 不认识评分方案，不写入任何存储。

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{AppResult, ParseError};
use crate::infrastructure::html_document::{ElementRef, HtmlDocument};
use crate::models::response::{ParsedResponse, SectionTally, ShiftId, Verdict};

/// 分区标题的类名
pub const SECTION_LABEL_CLASS: &str = "section-lbl";
/// 题目面板的类名
pub const QUESTION_PANEL_CLASS: &str = "question-pnl";
/// 正确答案单元格的类名
pub const RIGHT_ANSWER_CLASS: &str = "rightAns";

pub const CANDIDATE_NAME_LABEL: &str = "Candidate Name";
pub const ROLL_LABEL: &str = "Roll";
pub const CHOSEN_OPTION_LABEL: &str = "Chosen Option";
/// 未作答标记
pub const UNATTEMPTED_SENTINEL: &str = "--";

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("valid date regex"))
}

fn time_window_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{1,2}\s*:\s*\d{2}\s*(AM|PM)\s*-\s*\d{1,2}\s*:\s*\d{2}\s*(AM|PM)")
            .expect("valid time window regex")
    })
}

fn right_answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d)\.").expect("valid right answer regex"))
}

/// 答题卡解析服务
///
/// 职责：
/// - 提取场次标识（日期 + 时间段）
/// - 提取考生姓名与准考证号
/// - 按分区统计对 / 错 / 未答
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析一份答题卡
    ///
    /// 缺少日期、时间段、姓名或准考证号时返回 `ParseError`；
    /// 没有题目的分区不算错误，统计为空。
    pub fn parse(&self, html: &str) -> AppResult<ParsedResponse> {
        let doc = HtmlDocument::parse(html);

        let shift_id = self.extract_shift_id(&doc)?;
        let name = self.labeled_value(&doc, CANDIDATE_NAME_LABEL)?;
        let roll = self.labeled_value(&doc, ROLL_LABEL)?;
        let sections = self.tally_sections(&doc);

        debug!(
            "解析完成: 准考证号 {} | 场次 {} | {} 个分区",
            roll,
            shift_id,
            sections.len()
        );

        Ok(ParsedResponse {
            name,
            roll,
            shift_id,
            sections,
        })
    }

    /// 从全文中提取日期和时间段
    fn extract_shift_id(&self, doc: &HtmlDocument) -> Result<ShiftId, ParseError> {
        let text = doc.text_with(" ");

        let date = date_re()
            .find(&text)
            .ok_or(ParseError::MissingDate)?
            .as_str();
        let time_window = time_window_re()
            .find(&text)
            .ok_or(ParseError::MissingTimeWindow)?
            .as_str();

        Ok(ShiftId::from_tokens(date, time_window))
    }

    /// 标签单元格之后的取值单元格
    fn labeled_value(&self, doc: &HtmlDocument, label: &str) -> Result<String, ParseError> {
        let label_cell = find_label_cell(doc.elements(), label).ok_or_else(|| {
            ParseError::MissingLabel {
                label: label.to_string(),
            }
        })?;

        label_cell
            .next_sibling("td")
            .map(|cell| cell.text())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ParseError::MissingValue {
                label: label.to_string(),
            })
    }

    /// 按文档顺序扫描分区标题和题目面板
    fn tally_sections(&self, doc: &HtmlDocument) -> Vec<(String, SectionTally)> {
        let mut sections: Vec<(String, SectionTally)> = Vec::new();
        let mut current: Option<usize> = None;

        for el in doc.elements().filter(|e| e.tag() == "div") {
            if el.has_class(SECTION_LABEL_CLASS) {
                let label = el.text();
                // 同名分区再次出现时继续累计到首次出现的位置
                let index = match sections.iter().position(|(name, _)| *name == label) {
                    Some(index) => index,
                    None => {
                        sections.push((label, SectionTally::default()));
                        sections.len() - 1
                    }
                };
                current = Some(index);
            }

            if el.has_class(QUESTION_PANEL_CLASS) {
                match current {
                    Some(index) => sections[index].1.record(self.classify(el)),
                    None => debug!("分区标题之前的题目面板，已忽略"),
                }
            }
        }

        sections
    }

    /// 单题判定：未答 / 答对 / 答错
    fn classify(&self, panel: ElementRef<'_>) -> Verdict {
        let chosen = find_label_cell(panel.descendants(), CHOSEN_OPTION_LABEL)
            .and_then(|cell| cell.next_sibling("td"))
            .map(|cell| cell.text());

        let chosen = match chosen.as_deref() {
            None | Some(UNATTEMPTED_SENTINEL) => return Verdict::Unattempted,
            Some(raw) => match raw.parse::<u32>() {
                Ok(option) => option,
                Err(_) => {
                    warn!("无法识别的所选选项 '{}'，按未作答处理", raw);
                    return Verdict::Unattempted;
                }
            },
        };

        let correct = panel
            .descendants()
            .find(|e| e.tag() == "td" && e.has_class(RIGHT_ANSWER_CLASS))
            .and_then(|cell| {
                let text = cell.text();
                right_answer_re()
                    .captures(&text)
                    .and_then(|caps| caps[1].parse::<u32>().ok())
            });

        if Some(chosen) == correct {
            Verdict::Correct
        } else {
            Verdict::Wrong
        }
    }
}

/// 包含标签文字的最内层单元格（外层单元格可能整张嵌套表格都包在里面）
fn find_label_cell<'a>(
    mut elements: impl Iterator<Item = ElementRef<'a>>,
    label: &str,
) -> Option<ElementRef<'a>> {
    elements.find(|e| {
        e.tag() == "td"
            && !e.descendants().any(|d| d.tag() == "td")
            && e.text().contains(label)
    })
}
