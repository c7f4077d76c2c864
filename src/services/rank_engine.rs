//! 排名服务 - 业务能力层
//!
//! 竞赛排名（1-2-2-4）：名次 = 1 + 总分严格高于自己的人数。
//! 每次全表重算，不做增量维护。

use crate::models::result::CandidateRecord;
use crate::models::shift::ShiftTable;

#[derive(Debug, Default, Clone, Copy)]
pub struct RankEngine;

impl RankEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn recompute(&self, table: &mut ShiftTable) {
        assign_competition_ranks(&mut table.records);
    }
}

/// 按总分降序排序下标后依次赋名次，记录本身保持原有行顺序
pub fn assign_competition_ranks(records: &mut [CandidateRecord]) {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| records[b].final_marks.total_cmp(&records[a].final_marks));

    let mut previous: Option<f64> = None;
    let mut rank = 0;
    for (position, &index) in order.iter().enumerate() {
        let marks = records[index].final_marks;
        if previous != Some(marks) {
            rank = position as u32 + 1;
        }
        records[index].rank = Some(rank);
        previous = Some(marks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{CandidateIdentity, ScoreSheet};

    fn records(marks: &[f64]) -> Vec<CandidateRecord> {
        marks
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                CandidateRecord::new(
                    CandidateIdentity {
                        name: format!("C{}", i),
                        roll: i.to_string(),
                        category: "GEN".to_string(),
                        gender: "M".to_string(),
                        state: "UP".to_string(),
                    },
                    ScoreSheet {
                        subjects: Vec::new(),
                        final_marks: m,
                    },
                )
            })
            .collect()
    }

    fn ranks(marks: &[f64]) -> Vec<u32> {
        let mut rs = records(marks);
        assign_competition_ranks(&mut rs);
        rs.iter().map(|r| r.rank.unwrap()).collect()
    }

    #[test]
    fn ties_share_rank_and_skip() {
        assert_eq!(ranks(&[90.0, 90.0, 80.0]), vec![1, 1, 3]);
        assert_eq!(ranks(&[50.0, 70.0, 70.0, 60.0]), vec![4, 1, 1, 3]);
    }

    #[test]
    fn negative_and_fractional_marks() {
        assert_eq!(ranks(&[-1.5, 0.25, -1.5, 0.0]), vec![3, 1, 3, 2]);
    }

    #[test]
    fn empty_table_is_fine() {
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn rank_equals_one_plus_strictly_greater() {
        let marks = [12.0, 7.5, 12.0, 3.0, 7.5, 7.5, 20.0, -2.0];
        let got = ranks(&marks);
        for (i, m) in marks.iter().enumerate() {
            let above = marks.iter().filter(|x| *x > m).count() as u32;
            assert_eq!(got[i], above + 1);
        }
    }
}
