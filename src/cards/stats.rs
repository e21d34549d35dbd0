use super::{Card, CardKind, CardProps, permission_rows, permissions_differ};
use crate::profile::{IS_MENTOR_STATS_VISIBLE, IS_STUDENT_STATS_VISIBLE, StudentStats};
use serde_json::{Value, json};

const STUDENT_PERMISSIONS: [(&str, &str); 1] = [(IS_STUDENT_STATS_VISIBLE, "Student stats")];
const MENTOR_PERMISSIONS: [(&str, &str); 1] = [(IS_MENTOR_STATS_VISIBLE, "Mentor stats")];

/// Courses taken as a student; the cached active course is listed first
pub struct StudentStatsCard;

/// Courses mentored, with the students of each
pub struct MentorStatsCard;

fn student_course(stat: &StudentStats, active_course_id: Option<u32>) -> Value {
    let tasks: Vec<Value> = stat
        .tasks
        .iter()
        .map(|task| {
            json!({
                "name": task.name,
                "score": task.score,
                "max_score": task.max_score,
                "comment": task.comment,
                "pr_uri": task.github_pr_uri,
            })
        })
        .collect();

    json!({
        "course_id": stat.course_id,
        "course_name": stat.course_name,
        "course_full_name": stat.course_full_name,
        "location_name": stat.location_name,
        "is_expelled": stat.is_expelled,
        "expelling_reason": stat.expelling_reason,
        "is_completed": stat.is_course_completed,
        "is_active": Some(stat.course_id) == active_course_id,
        "total_score": stat.total_score,
        "mentor": stat.mentor.as_ref().map(|m| json!({ "name": m.name, "github_id": m.github_id })),
        "tasks": tasks,
    })
}

impl Card for StudentStatsCard {
    fn kind(&self) -> CardKind {
        CardKind::StudentStats
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("student_stats", include_str!("../templates/student_stats.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props
            .record
            .student_stats
            .as_ref()
            .is_some_and(|stats| !stats.is_empty())
    }

    fn context(&self, props: &CardProps) -> Value {
        let mut stats: Vec<&StudentStats> = props
            .record
            .student_stats
            .as_ref()
            .map(|stats| stats.iter().collect())
            .unwrap_or_default();
        // stable sort keeps API order for the rest
        stats.sort_by_key(|stat| Some(stat.course_id) != props.active_course_id);

        let courses: Vec<Value> = stats
            .into_iter()
            .map(|stat| student_course(stat, props.active_course_id))
            .collect();

        json!({
            "edit_mode": props.edit_mode,
            "courses": courses,
            "permissions": permission_rows(props.record, &STUDENT_PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.student_stats != next.record.student_stats
            || prev.active_course_id != next.active_course_id
            || permissions_differ(prev.record, next.record, &STUDENT_PERMISSIONS)
    }
}

impl Card for MentorStatsCard {
    fn kind(&self) -> CardKind {
        CardKind::MentorStats
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("mentor_stats", include_str!("../templates/mentor_stats.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props
            .record
            .mentor_stats
            .as_ref()
            .is_some_and(|stats| !stats.is_empty())
    }

    fn context(&self, props: &CardProps) -> Value {
        let courses: Vec<Value> = props
            .record
            .mentor_stats
            .iter()
            .flatten()
            .map(|stat| {
                let students: Vec<Value> = stat
                    .students
                    .iter()
                    .flatten()
                    .map(|s| {
                        json!({
                            "name": s.name,
                            "github_id": s.github_id,
                            "is_expelled": s.is_expelled,
                            "total_score": s.total_score,
                        })
                    })
                    .collect();
                json!({
                    "course_name": stat.course_name,
                    "course_full_name": stat.course_full_name,
                    "location_name": stat.location_name,
                    "student_count": students.len(),
                    "students": students,
                })
            })
            .collect();

        json!({
            "edit_mode": props.edit_mode,
            "courses": courses,
            "permissions": permission_rows(props.record, &MENTOR_PERMISSIONS),
        })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.mentor_stats != next.record.mentor_stats
            || permissions_differ(prev.record, next.record, &MENTOR_PERMISSIONS)
    }
}
