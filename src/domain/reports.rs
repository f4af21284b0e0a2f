use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::onboarding::{
    OnboardingDetail, OnboardingMilestone, OnboardingTask, PhaseProgressEntry, TaskStatus,
    TicketStatus,
};
use crate::models::profile::{
    AcademicRecord, BehavioralRecord, CommunicationLog, Goal, Intervention, ProfileDetail,
    ReportType,
};

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub skipped: usize,
    pub blocked: usize,
}

pub fn task_counts(tasks: &[OnboardingTask]) -> TaskCounts {
    let mut counts = TaskCounts {
        total: tasks.len(),
        ..TaskCounts::default()
    };
    for task in tasks {
        match task.status.parse().unwrap_or(TaskStatus::Pending) {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Skipped => counts.skipped += 1,
            TaskStatus::Blocked => counts.blocked += 1,
        }
    }
    counts
}

#[derive(Debug, Serialize)]
pub struct MilestoneSummary {
    pub id: Uuid,
    pub title: String,
    pub phase: String,
    pub status: String,
    pub target_date: Option<NaiveDate>,
}

/// Read-only summary of one onboarding: stored progress numbers plus task,
/// milestone and ticket tallies. Pure projection over already-loaded data.
#[derive(Debug, Serialize)]
pub struct OnboardingReport {
    pub onboarding_id: Uuid,
    pub school_id: Uuid,
    pub status: String,
    pub current_phase: String,
    pub overall_progress: i32,
    pub phase_progress: Vec<PhaseProgressEntry>,
    pub task_counts: TaskCounts,
    pub open_ticket_count: usize,
    pub upcoming_milestones: Vec<MilestoneSummary>,
    pub generated_at: DateTime<Utc>,
}

fn upcoming_milestones(milestones: &[OnboardingMilestone]) -> Vec<MilestoneSummary> {
    let mut upcoming: Vec<&OnboardingMilestone> = milestones
        .iter()
        .filter(|m| {
            !m.status
                .parse::<TaskStatus>()
                .unwrap_or(TaskStatus::Pending)
                .is_terminal()
        })
        .collect();
    // earliest target first, undated last
    upcoming.sort_by_key(|m| (m.target_date.is_none(), m.target_date));
    upcoming
        .into_iter()
        .map(|m| MilestoneSummary {
            id: m.id,
            title: m.title.clone(),
            phase: m.phase.clone(),
            status: m.status.clone(),
            target_date: m.target_date,
        })
        .collect()
}

pub fn onboarding_report(detail: OnboardingDetail, now: DateTime<Utc>) -> OnboardingReport {
    let open_ticket_count = detail
        .support_tickets
        .iter()
        .filter(|t| t.status.parse().unwrap_or(TicketStatus::Open) != TicketStatus::Resolved)
        .count();
    OnboardingReport {
        onboarding_id: detail.onboarding.id,
        school_id: detail.onboarding.school_id,
        status: detail.onboarding.status,
        current_phase: detail.onboarding.current_phase,
        overall_progress: detail.onboarding.overall_progress,
        phase_progress: detail.phase_progress,
        task_counts: task_counts(&detail.tasks),
        open_ticket_count,
        upcoming_milestones: upcoming_milestones(&detail.milestones),
        generated_at: now,
    }
}

/// Student profile report: a subset of the profile's collections selected
/// by the requested type. Omitted collections are left out of the JSON
/// entirely rather than serialized as empty arrays.
#[derive(Debug, Serialize)]
pub struct ProfileReport {
    pub report_type: ReportType,
    pub profile_id: Uuid,
    pub student_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_records: Option<Vec<AcademicRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Goal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavioral_records: Option<Vec<BehavioralRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Vec<Intervention>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_logs: Option<Vec<CommunicationLog>>,
    pub generated_at: DateTime<Utc>,
}

pub fn profile_report(
    detail: ProfileDetail,
    report_type: ReportType,
    now: DateTime<Utc>,
) -> ProfileReport {
    let academic = matches!(report_type, ReportType::Comprehensive | ReportType::Academic);
    let behavioral = matches!(
        report_type,
        ReportType::Comprehensive | ReportType::Behavioral
    );
    ProfileReport {
        report_type,
        profile_id: detail.profile.id,
        student_id: detail.profile.student_id,
        academic_records: academic.then_some(detail.academic_records),
        goals: academic.then_some(detail.goals),
        behavioral_records: behavioral.then_some(detail.behavioral_records),
        interventions: behavioral.then_some(detail.interventions),
        communication_logs: (report_type == ReportType::Comprehensive)
            .then_some(detail.communication_logs),
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::onboarding::SchoolOnboarding;
    use crate::models::profile::StudentProfile;

    fn onboarding_detail() -> OnboardingDetail {
        let now = Utc::now();
        OnboardingDetail {
            onboarding: SchoolOnboarding {
                id: Uuid::new_v4(),
                school_id: Uuid::new_v4(),
                coordinator_id: None,
                status: "in_progress".into(),
                current_phase: "documentation".into(),
                overall_progress: 40,
                target_launch_date: None,
                actual_launch_date: None,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            phase_progress: vec![],
            tasks: vec![],
            milestones: vec![],
            support_tickets: vec![],
            training_sessions: vec![],
        }
    }

    fn task(status: &str) -> OnboardingTask {
        let now = Utc::now();
        OnboardingTask {
            id: Uuid::new_v4(),
            onboarding_id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            phase: "initial_setup".into(),
            priority: "medium".into(),
            status: status.into(),
            completion_percentage: 0,
            due_date: None,
            completed_date: None,
            assigned_to: None,
            blockers: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn milestone(status: &str, target: Option<NaiveDate>) -> OnboardingMilestone {
        let now = Utc::now();
        OnboardingMilestone {
            id: Uuid::new_v4(),
            onboarding_id: Uuid::new_v4(),
            title: "m".into(),
            description: None,
            phase: "initial_setup".into(),
            status: status.into(),
            target_date: target,
            completed_date: None,
            sign_off_required: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn task_counts_tally_by_status() {
        let tasks = vec![
            task("pending"),
            task("pending"),
            task("in_progress"),
            task("completed"),
            task("blocked"),
        ];
        let counts = task_counts(&tasks);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.blocked, 1);
        assert_eq!(counts.skipped, 0);
    }

    #[test]
    fn upcoming_milestones_skip_terminal_and_sort_by_date() {
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let later = milestone("pending", Some(d2));
        let sooner = milestone("in_progress", Some(d1));
        let undated = milestone("pending", None);
        let done = milestone("completed", Some(d1));

        let upcoming = upcoming_milestones(&[later, done, undated, sooner]);
        assert_eq!(upcoming.len(), 3);
        assert_eq!(upcoming[0].target_date, Some(d1));
        assert_eq!(upcoming[1].target_date, Some(d2));
        assert_eq!(upcoming[2].target_date, None);
    }

    #[test]
    fn onboarding_report_counts_open_tickets_only() {
        let mut detail = onboarding_detail();
        let now = Utc::now();
        let ticket = |status: &str| crate::models::onboarding::SupportTicket {
            id: Uuid::new_v4(),
            onboarding_id: detail.onboarding.id,
            subject: "s".into(),
            description: None,
            severity: "low".into(),
            status: status.into(),
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        detail.support_tickets = vec![ticket("open"), ticket("in_progress"), ticket("resolved")];
        let report = onboarding_report(detail, now);
        assert_eq!(report.open_ticket_count, 2);
        assert_eq!(report.overall_progress, 40);
    }

    fn profile_detail() -> ProfileDetail {
        let now = Utc::now();
        let profile_id = Uuid::new_v4();
        ProfileDetail {
            profile: StudentProfile {
                id: profile_id,
                student_id: Uuid::new_v4(),
                notes: None,
                created_at: now,
                updated_at: now,
            },
            academic_records: vec![AcademicRecord {
                id: Uuid::new_v4(),
                profile_id,
                subject: "math".into(),
                term: "T1".into(),
                score: 40,
                max_score: 50,
                grade: None,
                remarks: None,
                created_at: now,
            }],
            behavioral_records: vec![BehavioralRecord {
                id: Uuid::new_v4(),
                profile_id,
                category: "positive".into(),
                description: "helped a classmate".into(),
                action_taken: None,
                created_at: now,
            }],
            interventions: vec![],
            communication_logs: vec![CommunicationLog {
                id: Uuid::new_v4(),
                profile_id,
                channel: "call".into(),
                contact_person: None,
                summary: "spoke with guardian".into(),
                created_at: now,
            }],
            goals: vec![],
        }
    }

    #[test]
    fn academic_report_selects_academic_collections() {
        let report = profile_report(profile_detail(), ReportType::Academic, Utc::now());
        assert!(report.academic_records.is_some());
        assert!(report.goals.is_some());
        assert!(report.behavioral_records.is_none());
        assert!(report.interventions.is_none());
        assert!(report.communication_logs.is_none());
    }

    #[test]
    fn behavioral_report_selects_behavioral_collections() {
        let report = profile_report(profile_detail(), ReportType::Behavioral, Utc::now());
        assert!(report.academic_records.is_none());
        assert!(report.goals.is_none());
        assert!(report.behavioral_records.is_some());
        assert!(report.interventions.is_some());
        assert!(report.communication_logs.is_none());
    }

    #[test]
    fn comprehensive_report_selects_everything() {
        let report = profile_report(profile_detail(), ReportType::Comprehensive, Utc::now());
        assert!(report.academic_records.is_some());
        assert!(report.goals.is_some());
        assert!(report.behavioral_records.is_some());
        assert!(report.interventions.is_some());
        assert!(report.communication_logs.is_some());
    }
}
