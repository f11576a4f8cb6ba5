use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{
    courses::{
        entities::{Course, CourseRole, CourseUser},
        requests::CreateCourseRequest,
    },
    exercises::{entities::Exercise, requests::CreateExerciseRequest},
    modeling_submissions::entities::ModelingSubmission,
    participations::entities::Participation,
    results::entities::{AssessmentResult, LockAcquisition},
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 提交内容的写入参数
#[derive(Debug, Clone)]
pub struct SubmissionContent {
    pub model: Option<String>,
    pub explanation_text: Option<String>,
    pub submitted: bool,
}

/// 按练习筛选提交
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub submitted_only: bool,
    /// 仅包含该评审人持有结果的提交
    pub assessed_by: Option<i64>,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    // 同步用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 课程
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    // 添加或更新课程成员角色
    async fn upsert_course_user(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser>;
    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>>;

    /// 练习
    async fn create_exercise(&self, exercise: CreateExerciseRequest) -> Result<Exercise>;
    async fn get_exercise_by_id(&self, exercise_id: i64) -> Result<Option<Exercise>>;

    /// 参与记录
    async fn create_participation(
        &self,
        exercise_id: Option<i64>,
        student_id: i64,
        initialization_date: DateTime<Utc>,
    ) -> Result<Participation>;
    async fn get_participation_by_id(&self, participation_id: i64)
    -> Result<Option<Participation>>;
    async fn get_participation_by_exercise_and_student(
        &self,
        exercise_id: i64,
        student_id: i64,
    ) -> Result<Option<Participation>>;

    /// 提交
    async fn get_submission_by_id(&self, submission_id: i64)
    -> Result<Option<ModelingSubmission>>;
    async fn get_submission_by_participation_id(
        &self,
        participation_id: i64,
    ) -> Result<Option<ModelingSubmission>>;
    // 写入参与记录的提交：不存在则创建，存在则替换内容
    async fn save_submission(
        &self,
        participation_id: i64,
        content: SubmissionContent,
    ) -> Result<ModelingSubmission>;
    async fn list_submissions_by_exercise(
        &self,
        exercise_id: i64,
        filter: SubmissionFilter,
    ) -> Result<Vec<ModelingSubmission>>;
    // 已提交且没有任何评审结果的提交 ID，按提交时间升序
    async fn list_unassessed_submission_ids(
        &self,
        exercise_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<i64>>;

    /// 评审结果与评审锁
    async fn get_result_by_submission_id(
        &self,
        submission_id: i64,
    ) -> Result<Option<AssessmentResult>>;
    // 评审人当前持有的锁数量（跨所有练习）
    async fn count_locks_by_assessor(&self, assessor_id: i64) -> Result<u64>;
    async fn list_locks_by_assessor(&self, assessor_id: i64) -> Result<Vec<AssessmentResult>>;
    // 在单个事务中检查上限并创建未完成的评审结果
    async fn acquire_assessment_lock(
        &self,
        submission_id: i64,
        assessor_id: i64,
        lock_limit: u64,
    ) -> Result<LockAcquisition>;
    // 保存分数，submit 为 true 时完成评审并释放锁
    async fn save_assessment(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        submit: bool,
    ) -> Result<Option<AssessmentResult>>;
    // 删除未完成的评审结果
    async fn cancel_assessment(&self, result_id: i64) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
