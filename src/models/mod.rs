pub mod exam;
pub mod loaders;
pub mod response;
pub mod result;
pub mod shift;
pub mod submission;

pub use exam::{exam_id, ExamConfig, MarkingScheme, SubjectConfig};
pub use loaders::{load_all_submissions, load_exam_config, load_submission};
pub use response::{ParsedResponse, SectionTally, ShiftId, Verdict};
pub use result::{CandidateIdentity, CandidateRecord, ScoreSheet, SubjectResult};
pub use shift::{ShiftSchema, ShiftTable, UpsertOutcome};
pub use submission::{DocumentSource, Submission};
