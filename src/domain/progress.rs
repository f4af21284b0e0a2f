use crate::models::onboarding::{OnboardingPhase, PhaseStatus, TaskStatus};

/// The slice of a task the roll-up arithmetic needs.
#[derive(Debug, Clone)]
pub struct TaskProgress {
    pub phase: OnboardingPhase,
    pub status: TaskStatus,
    pub completion_percentage: i32,
}

/// Rolled-up progress of one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseProgress {
    pub phase: OnboardingPhase,
    pub progress: i32,
    pub status: PhaseStatus,
}

fn contribution(task: &TaskProgress) -> i64 {
    if task.status == TaskStatus::Completed {
        100
    } else {
        i64::from(task.completion_percentage)
    }
}

/// Overall progress 0..=100: mean task contribution, rounded. A completed
/// task counts 100; anything else counts its own completion percentage.
/// An empty task list is 0, never a division by zero.
pub fn overall_progress(tasks: &[TaskProgress]) -> i32 {
    if tasks.is_empty() {
        return 0;
    }
    let sum: i64 = tasks.iter().map(contribution).sum();
    (sum as f64 / tasks.len() as f64).round() as i32
}

/// Per-phase roll-up in fixed phase order. Phases without tasks get no
/// entry. Progress counts completed tasks only; status is completed at
/// 100, in_progress above 0, pending otherwise.
pub fn phase_progress(tasks: &[TaskProgress]) -> Vec<PhaseProgress> {
    let mut entries = Vec::new();
    for phase in OnboardingPhase::ALL {
        let total = tasks.iter().filter(|t| t.phase == phase).count();
        if total == 0 {
            continue;
        }
        let completed = tasks
            .iter()
            .filter(|t| t.phase == phase && t.status == TaskStatus::Completed)
            .count();
        let progress = (100.0 * completed as f64 / total as f64).round() as i32;
        let status = if progress == 100 {
            PhaseStatus::Completed
        } else if progress > 0 {
            PhaseStatus::InProgress
        } else {
            PhaseStatus::Pending
        };
        entries.push(PhaseProgress {
            phase,
            progress,
            status,
        });
    }
    entries
}

/// First phase (in fixed order) currently in progress. When no phase is
/// in progress the previous value is kept unchanged.
pub fn current_phase(entries: &[PhaseProgress], previous: OnboardingPhase) -> OnboardingPhase {
    for phase in OnboardingPhase::ALL {
        if entries
            .iter()
            .any(|e| e.phase == phase && e.status == PhaseStatus::InProgress)
        {
            return phase;
        }
    }
    previous
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(phase: OnboardingPhase, status: TaskStatus, pct: i32) -> TaskProgress {
        TaskProgress {
            phase,
            status,
            completion_percentage: pct,
        }
    }

    #[test]
    fn empty_task_list_rolls_up_to_zero() {
        assert_eq!(overall_progress(&[]), 0);
        assert!(phase_progress(&[]).is_empty());
    }

    #[test]
    fn completed_tasks_contribute_full_weight() {
        let tasks = vec![
            task(OnboardingPhase::InitialSetup, TaskStatus::Completed, 40),
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
        ];
        // completed contributes 100 regardless of its stored percentage
        assert_eq!(overall_progress(&tasks), 50);
    }

    #[test]
    fn in_progress_tasks_contribute_their_percentage() {
        let tasks = vec![
            task(OnboardingPhase::Documentation, TaskStatus::InProgress, 60),
            task(OnboardingPhase::Documentation, TaskStatus::Pending, 0),
        ];
        assert_eq!(overall_progress(&tasks), 30);
    }

    #[test]
    fn overall_progress_rounds_to_nearest() {
        let tasks = vec![
            task(OnboardingPhase::InitialSetup, TaskStatus::Completed, 0),
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
        ];
        // 100/3 = 33.33 -> 33
        assert_eq!(overall_progress(&tasks), 33);
        let tasks = vec![
            task(OnboardingPhase::InitialSetup, TaskStatus::Completed, 0),
            task(OnboardingPhase::InitialSetup, TaskStatus::Completed, 0),
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
        ];
        // 200/3 = 66.67 -> 67
        assert_eq!(overall_progress(&tasks), 67);
    }

    #[test]
    fn completing_tasks_never_decreases_overall() {
        let mut tasks = vec![
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
            task(OnboardingPhase::Documentation, TaskStatus::InProgress, 45),
            task(OnboardingPhase::PilotTesting, TaskStatus::Blocked, 10),
            task(OnboardingPhase::FullLaunch, TaskStatus::InProgress, 80),
        ];
        let mut last = overall_progress(&tasks);
        for i in 0..tasks.len() {
            tasks[i].status = TaskStatus::Completed;
            let next = overall_progress(&tasks);
            assert!(next >= last, "progress dropped from {last} to {next}");
            last = next;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn phase_without_tasks_gets_no_entry() {
        let tasks = vec![task(
            OnboardingPhase::TeacherTraining,
            TaskStatus::Pending,
            0,
        )];
        let entries = phase_progress(&tasks);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].phase, OnboardingPhase::TeacherTraining);
    }

    #[test]
    fn four_tasks_two_phases_one_completed() {
        // 2 tasks in each of two phases; one task of the first completed.
        let tasks = vec![
            task(OnboardingPhase::InitialSetup, TaskStatus::Completed, 0),
            task(OnboardingPhase::InitialSetup, TaskStatus::Pending, 0),
            task(OnboardingPhase::Documentation, TaskStatus::Pending, 0),
            task(OnboardingPhase::Documentation, TaskStatus::Pending, 0),
        ];
        assert_eq!(overall_progress(&tasks), 25);

        let entries = phase_progress(&tasks);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            PhaseProgress {
                phase: OnboardingPhase::InitialSetup,
                progress: 50,
                status: PhaseStatus::InProgress,
            }
        );
        assert_eq!(
            entries[1],
            PhaseProgress {
                phase: OnboardingPhase::Documentation,
                progress: 0,
                status: PhaseStatus::Pending,
            }
        );
        assert_eq!(
            current_phase(&entries, OnboardingPhase::InitialSetup),
            OnboardingPhase::InitialSetup
        );
    }

    #[test]
    fn current_phase_picks_first_in_progress_in_fixed_order() {
        let entries = vec![
            PhaseProgress {
                phase: OnboardingPhase::InitialSetup,
                progress: 100,
                status: PhaseStatus::Completed,
            },
            PhaseProgress {
                phase: OnboardingPhase::TeacherTraining,
                progress: 50,
                status: PhaseStatus::InProgress,
            },
            PhaseProgress {
                phase: OnboardingPhase::PilotTesting,
                progress: 25,
                status: PhaseStatus::InProgress,
            },
        ];
        assert_eq!(
            current_phase(&entries, OnboardingPhase::InitialSetup),
            OnboardingPhase::TeacherTraining
        );
    }

    #[test]
    fn current_phase_unchanged_when_nothing_in_progress() {
        let entries = vec![PhaseProgress {
            phase: OnboardingPhase::InitialSetup,
            progress: 100,
            status: PhaseStatus::Completed,
        }];
        assert_eq!(
            current_phase(&entries, OnboardingPhase::Documentation),
            OnboardingPhase::Documentation
        );
        assert_eq!(
            current_phase(&[], OnboardingPhase::FullLaunch),
            OnboardingPhase::FullLaunch
        );
    }
}
