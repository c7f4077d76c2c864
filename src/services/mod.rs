pub mod exam_catalog;
pub mod rank_engine;
pub mod response_parser;
pub mod result_query;
pub mod result_store;
pub mod scorer;

pub use exam_catalog::ExamCatalog;
pub use rank_engine::RankEngine;
pub use response_parser::ResponseParser;
pub use result_query::{ResultQuery, ResultView};
pub use result_store::{ResultStore, RollLookup, UpsertReport};
pub use scorer::Scorer;
