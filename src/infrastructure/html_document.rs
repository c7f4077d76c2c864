//! HTML 文档 - 基础设施层
//!
//! 把答题卡 HTML 切分成一棵轻量的元素树，只暴露"按类名找元素、取文本、找兄弟单元格"的能力。
//! 不认识考生 / 分区 / 题目。
//!
//! 元素按在文档中出现的先后顺序存放，因此一个元素的所有后代在数组中是连续的一段。

use regex::Regex;
use std::sync::OnceLock;

/// 不需要闭合标签的元素
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// 内容按原样跳过的元素
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
        )
        .expect("valid tag regex")
    })
}

fn class_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("valid class regex")
    })
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("valid entity regex"))
}

#[derive(Debug, Clone)]
enum Child {
    Element(usize),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    parent: Option<usize>,
    children: Vec<Child>,
    /// 最后一个后代之后的下标
    end: usize,
}

/// 解析后的 HTML 文档
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    elements: Vec<Element>,
}

/// 文档中某个元素的只读视图
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a HtmlDocument,
    id: usize,
}

impl HtmlDocument {
    /// 宽松解析：未闭合的标签在文档末尾统一闭合，多余的闭合标签被忽略
    pub fn parse(html: &str) -> Self {
        let mut doc = Self {
            elements: vec![Element {
                tag: "#root".to_string(),
                classes: Vec::new(),
                parent: None,
                children: Vec::new(),
                end: 1,
            }],
        };
        let mut stack: Vec<usize> = vec![0];
        let mut pos = 0;

        while let Some(caps) = tag_re().captures_at(html, pos) {
            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((pos, pos));
            doc.push_text(&stack, &html[pos..whole.0]);
            pos = whole.1;

            // 注释、doctype、处理指令
            let Some(name) = caps.get(2) else {
                continue;
            };
            let tag = name.as_str().to_ascii_lowercase();
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

            if closing {
                doc.close(&mut stack, &tag);
                continue;
            }

            let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            doc.close_implied(&mut stack, &tag);
            let id = doc.open(&stack, &tag, attrs);

            let self_closing = attrs.trim_end().ends_with('/');
            if VOID_ELEMENTS.contains(&tag.as_str()) || self_closing {
                doc.elements[id].end = doc.elements.len();
                continue;
            }

            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                let closing_tag = format!("</{}", tag);
                let rest = &html[pos..];
                let skip = rest
                    .to_ascii_lowercase()
                    .find(&closing_tag)
                    .unwrap_or(rest.len());
                pos += skip;
                let after = html[pos..].find('>').map(|i| pos + i + 1).unwrap_or(html.len());
                pos = after;
                doc.elements[id].end = doc.elements.len();
                continue;
            }

            stack.push(id);
        }

        doc.push_text(&stack, &html[pos..]);
        while stack.len() > 1 {
            doc.pop(&mut stack);
        }
        doc.elements[0].end = doc.elements.len();
        doc
    }

    fn push_text(&mut self, stack: &[usize], raw: &str) {
        if raw.is_empty() {
            return;
        }
        let parent = *stack.last().unwrap_or(&0);
        self.elements[parent]
            .children
            .push(Child::Text(decode_entities(raw)));
    }

    fn open(&mut self, stack: &[usize], tag: &str, attrs: &str) -> usize {
        let parent = *stack.last().unwrap_or(&0);
        let id = self.elements.len();
        self.elements.push(Element {
            tag: tag.to_string(),
            classes: parse_classes(attrs),
            parent: Some(parent),
            children: Vec::new(),
            end: id + 1,
        });
        self.elements[parent].children.push(Child::Element(id));
        id
    }

    fn pop(&mut self, stack: &mut Vec<usize>) {
        if let Some(id) = stack.pop() {
            self.elements[id].end = self.elements.len();
        }
    }

    fn close(&mut self, stack: &mut Vec<usize>, tag: &str) {
        let Some(depth) = stack
            .iter()
            .rposition(|&id| id != 0 && self.elements[id].tag == tag)
        else {
            return;
        };
        while stack.len() > depth {
            self.pop(stack);
        }
    }

    /// 省略闭合标签的单元格 / 行
    fn close_implied(&mut self, stack: &mut Vec<usize>, tag: &str) {
        let closes: &[&str] = match tag {
            "td" | "th" => &["td", "th"],
            "tr" => &["td", "th", "tr"],
            "li" => &["li"],
            _ => return,
        };
        while let Some(&top) = stack.last() {
            if top != 0 && closes.contains(&self.elements[top].tag.as_str()) {
                self.pop(stack);
            } else {
                break;
            }
        }
    }

    fn element(&self, id: usize) -> ElementRef<'_> {
        ElementRef { doc: self, id }
    }

    /// 按文档顺序遍历所有元素
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        (1..self.elements.len()).map(move |id| self.element(id))
    }

    /// 全文文本，各文本片段之间以 `separator` 连接
    pub fn text_with(&self, separator: &str) -> String {
        let mut parts = Vec::new();
        self.collect_text(0, &mut parts);
        parts.join(separator)
    }

    fn collect_text<'a>(&'a self, id: usize, out: &mut Vec<&'a str>) {
        for child in &self.elements[id].children {
            match child {
                Child::Text(text) => out.push(text),
                Child::Element(child_id) => self.collect_text(*child_id, out),
            }
        }
    }
}

impl<'a> ElementRef<'a> {
    pub fn tag(&self) -> &'a str {
        &self.doc.elements[self.id].tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.doc.elements[self.id]
            .classes
            .iter()
            .any(|c| c == class)
    }

    /// 后代元素（文档顺序）
    pub fn descendants(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let doc = self.doc;
        let end = doc.elements[self.id].end;
        (self.id + 1..end).map(move |id| doc.element(id))
    }

    /// 各文本片段去除首尾空白后直接拼接，空片段丢弃
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        self.doc.collect_text(self.id, &mut parts);
        parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("")
    }

    /// 之后第一个标签为 `tag` 的兄弟元素
    pub fn next_sibling(&self, tag: &str) -> Option<ElementRef<'a>> {
        let parent = self.doc.elements[self.id].parent?;
        self.doc.elements[parent]
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Element(id) => Some(*id),
                Child::Text(_) => None,
            })
            .skip_while(|&id| id != self.id)
            .skip(1)
            .map(|id| self.doc.element(id))
            .find(|el| el.tag() == tag)
    }
}

fn parse_classes(attrs: &str) -> Vec<String> {
    class_attr_re()
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    entity_re()
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
