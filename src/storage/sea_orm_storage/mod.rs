//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod courses;
mod exercises;
mod participations;
mod results;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{AssessmentError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout_secs: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout_secs).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout_secs).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AssessmentError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存数据库的每个连接都是独立的库，连接不能被回收
        let in_memory = url.contains(":memory:");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout((!in_memory).then(|| Duration::from_secs(300)))
            .max_lifetime((!in_memory).then(|| Duration::from_secs(1800)))
            .connect_with(opt)
            .await
            .map_err(|e| AssessmentError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(pool_size.min(5))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AssessmentError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AssessmentError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::{Storage, SubmissionContent, SubmissionFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn upsert_course_user(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser> {
        self.upsert_course_user_impl(course_id, user_id, role).await
    }

    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>> {
        self.get_course_user_impl(course_id, user_id).await
    }

    // 练习模块
    async fn create_exercise(&self, exercise: CreateExerciseRequest) -> Result<Exercise> {
        self.create_exercise_impl(exercise).await
    }

    async fn get_exercise_by_id(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        self.get_exercise_by_id_impl(exercise_id).await
    }

    // 参与记录模块
    async fn create_participation(
        &self,
        exercise_id: Option<i64>,
        student_id: i64,
        initialization_date: DateTime<Utc>,
    ) -> Result<Participation> {
        self.create_participation_impl(exercise_id, student_id, initialization_date)
            .await
    }

    async fn get_participation_by_id(
        &self,
        participation_id: i64,
    ) -> Result<Option<Participation>> {
        self.get_participation_by_id_impl(participation_id).await
    }

    async fn get_participation_by_exercise_and_student(
        &self,
        exercise_id: i64,
        student_id: i64,
    ) -> Result<Option<Participation>> {
        self.get_participation_by_exercise_and_student_impl(exercise_id, student_id)
            .await
    }

    // 提交模块
    async fn get_submission_by_id(
        &self,
        submission_id: i64,
    ) -> Result<Option<ModelingSubmission>> {
        self.get_submission_by_id_impl(submission_id).await
    }

    async fn get_submission_by_participation_id(
        &self,
        participation_id: i64,
    ) -> Result<Option<ModelingSubmission>> {
        self.get_submission_by_participation_id_impl(participation_id)
            .await
    }

    async fn save_submission(
        &self,
        participation_id: i64,
        content: SubmissionContent,
    ) -> Result<ModelingSubmission> {
        self.save_submission_impl(participation_id, content).await
    }

    async fn list_submissions_by_exercise(
        &self,
        exercise_id: i64,
        filter: SubmissionFilter,
    ) -> Result<Vec<ModelingSubmission>> {
        self.list_submissions_by_exercise_impl(exercise_id, filter)
            .await
    }

    async fn list_unassessed_submission_ids(
        &self,
        exercise_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<i64>> {
        self.list_unassessed_submission_ids_impl(exercise_id, limit)
            .await
    }

    // 评审结果模块
    async fn get_result_by_submission_id(
        &self,
        submission_id: i64,
    ) -> Result<Option<AssessmentResult>> {
        self.get_result_by_submission_id_impl(submission_id).await
    }

    async fn count_locks_by_assessor(&self, assessor_id: i64) -> Result<u64> {
        self.count_locks_by_assessor_impl(assessor_id).await
    }

    async fn list_locks_by_assessor(&self, assessor_id: i64) -> Result<Vec<AssessmentResult>> {
        self.list_locks_by_assessor_impl(assessor_id).await
    }

    async fn acquire_assessment_lock(
        &self,
        submission_id: i64,
        assessor_id: i64,
        lock_limit: u64,
    ) -> Result<LockAcquisition> {
        self.acquire_assessment_lock_impl(submission_id, assessor_id, lock_limit)
            .await
    }

    async fn save_assessment(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        submit: bool,
    ) -> Result<Option<AssessmentResult>> {
        self.save_assessment_impl(result_id, assessor_id, score, submit)
            .await
    }

    async fn cancel_assessment(&self, result_id: i64) -> Result<bool> {
        self.cancel_assessment_impl(result_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("modeling.db").unwrap(),
            "sqlite://modeling.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
