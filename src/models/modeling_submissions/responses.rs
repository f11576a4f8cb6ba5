//! 建模提交的对外视图
//!
//! 所有返回提交的接口都通过 [`ModelingSubmissionResponse::for_viewer`] 构建响应：
//! - 练习的样例解答永远不会出现在视图里
//! - 参与记录只携带自身信息，不带历史提交与历史结果
//! - 评分说明只对评审人可见
//! - 学生身份只对教师可见（助教盲评）
//! - 学生查看自己的提交时，只能看到已完成的结果，且看不到评审人

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::exercises::entities::{DiagramType, Exercise, ExerciseType};
use crate::models::modeling_submissions::entities::SubmissionAggregate;
use crate::models::participations::entities::Participation;
use crate::models::results::entities::AssessmentResult;
use crate::models::users::entities::User;

/// 请求者视角
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionViewer {
    /// 提交的作者
    Student,
    /// 助教
    Tutor,
    /// 教师或管理员
    Instructor,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct UserBrief {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
}

impl From<User> for UserBrief {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ExerciseView {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub exercise_type: ExerciseType,
    pub diagram_type: Option<DiagramType>,
    pub max_score: f64,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading_instructions: Option<String>,
}

impl ExerciseView {
    fn build(exercise: Exercise, with_grading_instructions: bool) -> Self {
        Self {
            id: exercise.id,
            course_id: exercise.course_id,
            title: exercise.title,
            exercise_type: exercise.exercise_type,
            diagram_type: exercise.diagram_type,
            max_score: exercise.max_score,
            due_date: exercise.due_date,
            grading_instructions: if with_grading_instructions {
                exercise.grading_instructions
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ParticipationView {
    pub id: i64,
    pub initialization_date: DateTime<Utc>,
    pub exercise: ExerciseView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserBrief>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ResultView {
    pub id: i64,
    pub score: Option<f64>,
    pub rated: bool,
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessor: Option<UserBrief>,
}

impl ResultView {
    fn build(result: AssessmentResult, assessor: Option<User>) -> Self {
        Self {
            id: result.id,
            score: result.score,
            rated: result.rated,
            completion_date: result.completion_date,
            assessor: assessor.map(UserBrief::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ModelingSubmissionResponse {
    pub id: i64,
    pub model: Option<String>,
    pub explanation_text: Option<String>,
    pub submitted: bool,
    pub submission_date: Option<DateTime<Utc>>,
    pub participation: ParticipationView,
    pub result: Option<ResultView>,
}

impl ModelingSubmissionResponse {
    /// 按请求者视角构建响应
    pub fn for_viewer(aggregate: SubmissionAggregate, viewer: SubmissionViewer) -> Self {
        let SubmissionAggregate {
            submission,
            participation,
            exercise,
            student,
            result,
            assessor,
        } = aggregate;

        let is_grader = viewer != SubmissionViewer::Student;
        let show_student = viewer == SubmissionViewer::Instructor;

        let result = match viewer {
            // 学生只能看到已完成的结果，且不暴露评审人
            SubmissionViewer::Student => result
                .filter(AssessmentResult::is_finished)
                .map(|r| ResultView::build(r, None)),
            _ => result.map(|r| ResultView::build(r, assessor)),
        };

        Self {
            id: submission.id,
            model: submission.model,
            explanation_text: submission.explanation_text,
            submitted: submission.submitted,
            submission_date: submission.submission_date,
            participation: Self::participation_view(
                participation,
                exercise,
                student.filter(|_| show_student),
                is_grader,
            ),
            result,
        }
    }

    /// 学生保存提交后的响应，不携带任何结果
    pub fn for_author_without_result(aggregate: SubmissionAggregate) -> Self {
        let mut response = Self::for_viewer(aggregate, SubmissionViewer::Student);
        response.result = None;
        response
    }

    fn participation_view(
        participation: Participation,
        exercise: Exercise,
        student: Option<User>,
        with_grading_instructions: bool,
    ) -> ParticipationView {
        ParticipationView {
            id: participation.id,
            initialization_date: participation.initialization_date,
            exercise: ExerciseView::build(exercise, with_grading_instructions),
            student: student.map(UserBrief::from),
        }
    }
}
