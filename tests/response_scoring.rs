mod common;

use rankpred::error::{AppError, ConfigError, ParseError};
use rankpred::models::SectionTally;
use rankpred::{ResponseParser, Scorer, ShiftId};

use common::{read_fixture, response_html, sample_exam};

#[test]
fn parses_sample_response_sheet() {
    let html = read_fixture("response_sample.html");
    let parsed = ResponseParser::new().parse(&html).unwrap();

    assert_eq!(parsed.name, "Asha Verma");
    assert_eq!(parsed.roll, "2201004512");
    assert_eq!(
        parsed.shift_id,
        ShiftId::from_normalized("21-04-2024_9-00AM-10-00AM")
    );
    assert_eq!(
        parsed.sections,
        vec![
            (
                "General Intelligence and Reasoning".to_string(),
                SectionTally::new(3, 1, 1)
            ),
            ("Computer Knowledge".to_string(), SectionTally::new(1, 1, 1)),
        ]
    );
}

#[test]
fn scores_sample_response_sheet() {
    let html = read_fixture("response_sample.html");
    let exam = sample_exam();
    let parsed = ResponseParser::new().parse(&html).unwrap();
    let sheet = Scorer::new()
        .score(&parsed.tallies(), &exam.subjects, &exam.scheme)
        .unwrap();

    let reasoning = &sheet.subjects[0];
    assert_eq!((reasoning.attempt, reasoning.r, reasoning.w, reasoning.na), (4, 3, 1, 1));
    assert_eq!(reasoning.marks, 8.0);

    // 资格性科目有成绩但不计入总分
    let computer = &sheet.subjects[1];
    assert_eq!(computer.marks, 2.0);
    assert!(!computer.count_in_total);
    assert_eq!(sheet.final_marks, 8.0);
}

#[test]
fn every_question_lands_in_exactly_one_bucket() {
    let html = read_fixture("response_sample.html");
    let parsed = ResponseParser::new().parse(&html).unwrap();
    let total: u32 = parsed.tallies().iter().map(SectionTally::questions).sum();
    assert_eq!(total, 8);
}

#[test]
fn negative_marking_scenario() {
    // 2 对 1 错 1 未答，对 +2 / 错 -1 → 3
    let html = response_html(
        "Ravi",
        "2401002",
        "22/04/2024",
        "1:30 PM - 2:30 PM",
        &[("Quant", [("1", 1), ("2", 2), ("3", 4), ("--", 1)].as_slice())],
    );
    let mut exam = sample_exam();
    exam.scheme.correct = 2.0;
    exam.subjects.truncate(1);

    let parsed = ResponseParser::new().parse(&html).unwrap();
    assert_eq!(parsed.shift_id.as_str(), "22-04-2024_1-30PM-2-30PM");

    let sheet = Scorer::new()
        .score(&parsed.tallies(), &exam.subjects, &exam.scheme)
        .unwrap();
    assert_eq!(sheet.final_marks, 3.0);
}

#[test]
fn section_count_must_match_subjects() {
    let html = response_html(
        "Ravi",
        "2401002",
        "22/04/2024",
        "1:30 PM - 2:30 PM",
        &[("Quant", [("1", 1)].as_slice())],
    );
    let exam = sample_exam();
    let parsed = ResponseParser::new().parse(&html).unwrap();

    let err = Scorer::new()
        .score(&parsed.tallies(), &exam.subjects, &exam.scheme)
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Config(ConfigError::SubjectCountMismatch {
            sections: 1,
            subjects: 2
        })
    ));
}

#[test]
fn document_without_roll_is_rejected() {
    let html = read_fixture("response_sample.html").replace("Roll No.", "Seat No.");
    let err = ResponseParser::new().parse(&html).unwrap_err();
    assert!(matches!(
        err,
        AppError::Parse(ParseError::MissingLabel { ref label }) if label == "Roll"
    ));
}
