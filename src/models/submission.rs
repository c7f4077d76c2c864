use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 答题卡来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// 本地 HTML 文件
    File(PathBuf),
    /// 在线结果页链接
    Url(String),
    /// 已读入内存的文档
    Inline(String),
}

/// 提交清单（收件目录中的一个 TOML 文件）
///
/// ```toml
/// exam_name = "SSC CGL"
/// category = "GEN"
/// gender = "F"
/// state = "Delhi"
/// document = "asha.html"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub exam_name: String,
    pub category: String,
    pub gender: String,
    pub state: String,
    /// 相对路径以清单所在目录为基准
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<PathBuf>,
}

impl Submission {
    /// 解析答题卡来源；document 优先于 url
    pub fn source(&self) -> Option<DocumentSource> {
        if let Some(document) = self.document.as_deref().filter(|d| !d.trim().is_empty()) {
            let path = Path::new(document);
            let resolved = match self.file_path.as_deref().and_then(Path::parent) {
                Some(base) if path.is_relative() => base.join(path),
                _ => path.to_path_buf(),
            };
            return Some(DocumentSource::File(resolved));
        }

        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| DocumentSource::Url(u.to_string()))
    }

    /// 扩展 Submission 以支持文件路径
    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 日志显示用的名称
    pub fn label(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.exam_name.clone())
    }
}
