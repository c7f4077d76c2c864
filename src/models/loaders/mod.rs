pub mod toml_loader;

pub use toml_loader::{
    exam_config_path, exam_dir, load_all_submissions, load_exam_config, load_submission,
    EXAM_CONFIG_FILE,
};
