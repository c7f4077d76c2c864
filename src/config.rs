/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 考试配置与成绩表的根目录
    pub data_dir: String,
    /// 待处理提交清单（TOML）存放目录
    pub inbox_folder: String,
    /// 同时处理的提交数量
    pub max_concurrent_submissions: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 处理成功后是否删除提交清单
    pub remove_processed: bool,
    /// 下载在线答题卡的超时时间（秒）
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            inbox_folder: "inbox".to_string(),
            max_concurrent_submissions: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            remove_processed: false,
            fetch_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or(default.data_dir),
            inbox_folder: std::env::var("INBOX_FOLDER").unwrap_or(default.inbox_folder),
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.max_concurrent_submissions),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            remove_processed: std::env::var("REMOVE_PROCESSED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.remove_processed),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.fetch_timeout_secs),
        }
    }

    /// 指定数据目录和收件目录（测试与嵌入使用）
    pub fn with_dirs(data_dir: impl Into<String>, inbox_folder: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            inbox_folder: inbox_folder.into(),
            ..Self::default()
        }
    }
}
