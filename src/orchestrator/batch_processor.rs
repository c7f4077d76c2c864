//! 批量提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量提交的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建成绩表存储和文档读取器
//! 2. **批量加载**：扫描收件目录中的所有提交清单（`Vec<Submission>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有提交的处理结果
//!
//! 同一场次的并发写入由 `ResultStore` 的分区锁串行化，这里不需要额外协调。

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::DocumentReader;
use crate::models::submission::Submission;
use crate::orchestrator::submission_processor::{process_submission, SubmissionStatus};
use crate::services::{ExamCatalog, ResultStore};
use crate::workflow::SubmissionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    catalog: Arc<ExamCatalog>,
    store: Arc<ResultStore>,
    flow: Arc<SubmissionFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let catalog = Arc::new(ExamCatalog::new(&config.data_dir));
        let store = Arc::new(ResultStore::json(&config.data_dir));
        let reader = Arc::new(DocumentReader::new(Duration::from_secs(
            config.fetch_timeout_secs,
        ))?);
        let flow = Arc::new(SubmissionFlow::new(
            catalog.clone(),
            store.clone(),
            reader,
        ));

        Ok(Self {
            config,
            catalog,
            store,
            flow,
        })
    }

    pub fn store(&self) -> Arc<ResultStore> {
        self.store.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let exams = self.catalog.list().await?;
        info!("📚 已配置 {} 场考试", exams.len());
        for exam in &exams {
            info!(
                "   - {} (对 {} / 错 {} / 未答 {}, {} 个科目)",
                exam.exam_name(),
                exam.scheme.correct,
                exam.scheme.wrong,
                exam.scheme.na,
                exam.subjects.len()
            );
        }

        // 加载所有待处理的提交
        let all_submissions = self.load_submissions().await?;

        if all_submissions.is_empty() {
            warn!("⚠️ 没有找到待处理的提交清单，程序结束");
            return Ok(ProcessingStats::default());
        }

        let total = all_submissions.len();
        log_submissions_loaded(total, self.config.max_concurrent_submissions);

        // 处理所有提交
        let stats = self.process_all(all_submissions).await?;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(stats)
    }

    /// 加载提交清单
    async fn load_submissions(&self) -> Result<Vec<Submission>> {
        info!("\n📁 正在扫描待处理的提交...");
        Ok(crate::models::load_all_submissions(&self.config.inbox_folder).await?)
    }

    /// 处理所有提交
    async fn process_all(&self, all_submissions: Vec<Submission>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_submissions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = all_submissions.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total);
            let batch = &all_submissions[batch_start..batch_end];
            let batch_num = (batch_start / batch_size) + 1;
            let total_batches = (total + batch_size - 1) / batch_size;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            // 处理本批
            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.saved += batch_result.saved;
            stats.rejected += batch_result.rejected;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[Submission],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut handles = Vec::with_capacity(batch.len());
        let mut indices = Vec::with_capacity(batch.len());

        // 为本批创建并发任务
        for (idx, submission) in batch.iter().enumerate() {
            let submission_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let submission = submission.clone();
            let remove_processed = self.config.remove_processed;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_submission(&flow, &submission, submission_index, remove_processed).await
            });
            handles.push(handle);
            indices.push(submission_index);
        }

        // 等待本批所有任务完成
        let mut result = ProcessingStats {
            total: batch.len(),
            ..Default::default()
        };

        for (submission_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(SubmissionStatus::Saved(_)) => result.saved += 1,
                Ok(SubmissionStatus::Rejected(_)) => result.rejected += 1,
                Ok(SubmissionStatus::Failed(_)) => result.failed += 1,
                Err(e) => {
                    error!("[提交 {}] 任务执行失败: {}", submission_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub saved: usize,
    pub rejected: usize,
    pub failed: usize,
    pub total: usize,
}

// ========== 日志辅助函数 ==========

fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n成绩处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量答题卡评分模式");
    info!("📂 数据目录: {}", config.data_dir);
    info!("📊 最大并发数: {}", config.max_concurrent_submissions);
    info!("{}", "=".repeat(60));
}

fn log_submissions_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待处理的提交", total);
    info!("📋 将以每批 {} 份的方式处理", max_concurrent);
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批提交: {}-{} / 共 {} 份", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &ProcessingStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 写入 {} / 拒绝 {} / 失败 {}",
        batch_num, result.saved, result.rejected, result.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 写入: {}/{}", stats.saved, stats.total);
    info!("⚠️ 拒绝: {}", stats.rejected);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
