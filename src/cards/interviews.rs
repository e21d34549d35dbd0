use super::{Card, CardKind, CardProps};
use crate::profile::{StudentStats, TaskStats};
use serde_json::{Value, json};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// CoreJS interviews taken as a student, grouped by course
pub struct CoreJsInterviewsCard;

/// Pre-screening (stage) interview feedback
pub struct StageInterviewsCard;

fn interview(task: &TaskStats) -> Value {
    let answers: Vec<Value> = task
        .interview_form_answers
        .iter()
        .flatten()
        .map(|answer| {
            let text = match &answer.answer {
                Value::String(text) => text.clone(),
                Value::Bool(true) => "Yes".to_string(),
                Value::Bool(false) => "No".to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            json!({ "question": answer.question_text, "answer": text })
        })
        .collect();

    json!({
        "name": task.name,
        "score": task.score,
        "comment": task.comment,
        "interviewer": task.interviewer.as_ref().map(|i| json!({ "name": i.name, "github_id": i.github_id })),
        "date": task.interview_date.map(|d| d.format(DATE_FORMAT).to_string()),
        "answers": answers,
    })
}

fn interviewed_courses<'a>(props: &CardProps<'a>) -> Vec<&'a StudentStats> {
    props
        .record
        .student_stats
        .iter()
        .flatten()
        .filter(|stat| stat.interviews().next().is_some())
        .collect()
}

impl Card for CoreJsInterviewsCard {
    fn kind(&self) -> CardKind {
        CardKind::CoreJsInterviews
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("core_js_interviews", include_str!("../templates/core_js_interviews.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        !interviewed_courses(props).is_empty()
    }

    fn context(&self, props: &CardProps) -> Value {
        let courses: Vec<Value> = interviewed_courses(props)
            .into_iter()
            .map(|stat| {
                json!({
                    "course_name": stat.course_name,
                    "course_full_name": stat.course_full_name,
                    "location_name": stat.location_name,
                    "interviews": stat.interviews().map(interview).collect::<Vec<_>>(),
                })
            })
            .collect();

        json!({ "courses": courses })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.student_stats != next.record.student_stats
    }
}

impl Card for StageInterviewsCard {
    fn kind(&self) -> CardKind {
        CardKind::StageInterviews
    }

    fn template(&self) -> (&'static str, &'static str) {
        ("stage_interviews", include_str!("../templates/stage_interviews.hbs"))
    }

    fn is_visible(&self, props: &CardProps) -> bool {
        props
            .record
            .stage_interview_feedback
            .as_ref()
            .is_some_and(|feedback| !feedback.is_empty())
    }

    fn context(&self, props: &CardProps) -> Value {
        let items: Vec<Value> = props
            .record
            .stage_interview_feedback
            .iter()
            .flatten()
            .map(|item| {
                json!({
                    "date": item.date.format(DATE_FORMAT).to_string(),
                    "course_name": item.course_name,
                    "course_full_name": item.course_full_name,
                    "interviewer": { "name": item.interviewer.name, "github_id": item.interviewer.github_id },
                    "rating": item.rating,
                    "comment": item.comment,
                    "is_good_candidate": item.is_good_candidate,
                })
            })
            .collect();

        json!({ "items": items })
    }

    fn slice_changed(&self, prev: &CardProps, next: &CardProps) -> bool {
        prev.record.stage_interview_feedback != next.record.stage_interview_feedback
    }
}
