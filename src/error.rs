use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 答题卡文档结构错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 考试配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 查询未命中
    #[error("查询错误: {0}")]
    Lookup(#[from] LookupError),
    /// 成绩表存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 答题卡解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// 缺少考试日期 (DD/MM/YYYY)
    #[error("文档中找不到考试日期 (DD/MM/YYYY)")]
    MissingDate,
    /// 缺少考试时间段 (H:MM AM - H:MM PM)
    #[error("文档中找不到考试时间段 (H:MM AM - H:MM PM)")]
    MissingTimeWindow,
    /// 缺少标签单元格
    #[error("文档中找不到标签单元格: {label}")]
    MissingLabel { label: String },
    /// 标签后没有取值单元格，或取值为空
    #[error("标签 {label} 后没有有效取值")]
    MissingValue { label: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 考试不存在（没有评分方案）
    #[error("考试不存在或缺少评分方案: {exam}")]
    ExamNotFound { exam: String },
    /// 考试没有配置科目
    #[error("考试 {exam} 没有配置任何科目")]
    NoSubjects { exam: String },
    /// 科目名称重复
    #[error("考试 {exam} 的科目名称重复: {subject}")]
    DuplicateSubject { exam: String, subject: String },
    /// 文档分区数与科目数不一致
    #[error("文档分区数 {sections} 与配置科目数 {subjects} 不一致")]
    SubjectCountMismatch { sections: usize, subjects: usize },
    /// 提交清单既没有 document 也没有 url
    #[error("提交清单 {submission} 没有 document 或 url")]
    MissingDocument { submission: String },
    /// 场次成绩表的科目列与当前配置不一致
    #[error("场次 {shift_id} 的成绩表科目列与当前配置不一致")]
    SchemaMismatch { shift_id: String },
}

/// 查询错误
#[derive(Debug, Error)]
pub enum LookupError {
    /// 考生不在任何场次中
    #[error("考试 {exam} 中找不到准考证号 {roll}")]
    RollNotFound { exam: String, roll: String },
}

/// 成绩表存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读写失败
    #[error("成绩表读写失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 成绩表内容损坏
    #[error("成绩表内容损坏 ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 后端错误
    #[error("存储后端错误: {message}")]
    Backend { message: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 下载文档失败
    #[error("下载文档失败 ({url}): {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 存储错误可以透明重试一次，其余错误对本次提交是终结性的
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Store(_))
    }
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
