//! 答题卡读取器 - 基础设施层
//!
//! 持有 HTTP 客户端，只暴露"把一个来源读成 HTML 文本"的能力

use std::time::Duration;

use tracing::debug;

use crate::error::{AppError, AppResult, FileError};
use crate::models::submission::DocumentSource;

pub struct DocumentReader {
    client: reqwest::Client,
}

impl DocumentReader {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Other(format!("无法创建 HTTP 客户端: {}", e)))?;
        Ok(Self { client })
    }

    /// 读取文档内容；非 UTF-8 字节按替换字符处理
    pub async fn read(&self, source: &DocumentSource) -> AppResult<String> {
        match source {
            DocumentSource::Inline(html) => Ok(html.clone()),
            DocumentSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        AppError::File(FileError::NotFound {
                            path: path.display().to_string(),
                        })
                    } else {
                        AppError::file_read_failed(path.display().to_string(), e)
                    }
                })?;
                debug!("已读取答题卡: {} ({} 字节)", path.display(), bytes.len());
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            DocumentSource::Url(url) => {
                let bytes = self
                    .fetch(url)
                    .await
                    .map_err(|e| AppError::File(FileError::FetchFailed {
                        url: url.clone(),
                        source: Box::new(e),
                    }))?;
                debug!("已下载答题卡: {} ({} 字节)", url, bytes.len());
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
