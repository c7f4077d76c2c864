//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量提交处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载提交清单（Vec<Submission>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `submission_processor` - 单份提交处理器
//! - 调用 SubmissionFlow
//! - 区分拒绝与故障
//! - 清理已处理的清单文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Submission>)
//!     ↓
//! submission_processor (处理单份 Submission)
//!     ↓
//! workflow::SubmissionFlow (解析 → 评分 → 写入)
//!     ↓
//! services (能力层：parser / scorer / store / rank)
//!     ↓
//! infrastructure (基础设施：HTML 文档、文档读取、成绩表后端)
//! ```

pub mod batch_processor;
pub mod submission_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use submission_processor::{process_submission, SubmissionStatus};
