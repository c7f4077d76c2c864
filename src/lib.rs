//! # RankPred
//!
//! 考试答题卡评分与场次排名
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有资源，只暴露能力
//! - `HtmlDocument` - 把答题卡 HTML 切成元素树
//! - `DocumentReader` - 读取本地文件或下载在线结果页
//! - `ShiftBackend` - 场次成绩表的整表读取与原子写入
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ResponseParser` - 场次、考生、分区对错统计
//! - `Scorer` - 按评分方案计算单科成绩与总分
//! - `ResultStore` - 分区加锁的写入 + 排名重算
//! - `RankEngine` - 竞赛排名
//! - `ResultQuery` - 按准考证号查询成绩单
//! - `ExamCatalog` - 考试配置的增删查
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionFlow` - 一份答题卡：解析 → 评分 → 写入
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理收件目录，管理并发
//! - `orchestrator/submission_processor` - 单份提交的错误分级与清理

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CandidateRecord, ExamConfig, MarkingScheme, ShiftId, SubjectConfig};
pub use orchestrator::{App, ProcessingStats};
pub use services::{ExamCatalog, RankEngine, ResponseParser, ResultQuery, ResultStore, ResultView, Scorer};
pub use workflow::{Demographics, ProcessResult, SubmissionCtx, SubmissionFlow};
