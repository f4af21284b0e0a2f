use std::collections::BTreeMap;

use uuid::Uuid;

/// One generated batch: every member is at `level`.
#[derive(Debug, PartialEq)]
pub struct LevelGroup {
    pub level: i32,
    pub student_ids: Vec<Uuid>,
}

/// Groups (student, level) pairs by level and chunks each level's students
/// into bins of at most `max_size`, keeping input order within a level.
/// Levels come out ascending.
pub fn chunk_by_level(students: &[(Uuid, i32)], max_size: usize) -> Vec<LevelGroup> {
    let size = max_size.max(1);
    let mut by_level: BTreeMap<i32, Vec<Uuid>> = BTreeMap::new();
    for (id, level) in students {
        by_level.entry(*level).or_default().push(*id);
    }
    let mut groups = Vec::new();
    for (level, ids) in by_level {
        for chunk in ids.chunks(size) {
            groups.push(LevelGroup {
                level,
                student_ids: chunk.to_vec(),
            });
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(chunk_by_level(&[], 5).is_empty());
    }

    #[test]
    fn one_level_chunks_into_bins() {
        let students: Vec<(Uuid, i32)> = ids(7).into_iter().map(|id| (id, 2)).collect();
        let groups = chunk_by_level(&students, 3);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].student_ids.len(), 3);
        assert_eq!(groups[1].student_ids.len(), 3);
        assert_eq!(groups[2].student_ids.len(), 1);
        assert!(groups.iter().all(|g| g.level == 2));
    }

    #[test]
    fn levels_come_out_ascending_and_separate() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let groups = chunk_by_level(&[(a, 3), (b, 1), (c, 3)], 10);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].level, 1);
        assert_eq!(groups[0].student_ids, vec![b]);
        assert_eq!(groups[1].level, 3);
        assert_eq!(groups[1].student_ids, vec![a, c]);
    }

    #[test]
    fn zero_max_size_still_makes_progress() {
        let students: Vec<(Uuid, i32)> = ids(2).into_iter().map(|id| (id, 1)).collect();
        let groups = chunk_by_level(&students, 0);
        assert_eq!(groups.len(), 2);
    }
}
