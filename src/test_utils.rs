//! 测试夹具
//!
//! 每个 `TestContext` 使用独立的 SQLite 数据库与 Moka 缓存，
//! 预置一个课程及其成员和三个练习。默认是单连接的内存库，
//! 并发测试使用 `file_backed` 创建的多连接文件库。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::web;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::cache::ObjectCache;
use crate::cache::object_cache::moka::MokaCacheWrapper;
use crate::models::courses::entities::{Course, CourseRole};
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::exercises::entities::{DiagramType, Exercise, ExerciseType};
use crate::models::exercises::requests::CreateExerciseRequest;
use crate::models::modeling_submissions::entities::ModelingSubmission;
use crate::models::participations::entities::Participation;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::storage::{Storage, SubmissionContent};
use crate::utils::jwt::JwtUtils;
use crate::utils::{json_error_handler, query_error_handler};

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub course: Course,
    pub admin: User,
    pub instructor: User,
    pub tutor: User,
    pub tutor2: User,
    pub student: User,
    pub student2: User,
    /// 不属于课程的用户
    pub outsider: User,
    /// 已截止的建模练习
    pub closed_exercise: Exercise,
    /// 未截止的建模练习
    pub open_exercise: Exercise,
    pub text_exercise: Exercise,
    counter: AtomicUsize,
    /// 文件库所在的临时目录，随上下文一起删除
    _db_dir: Option<TempDir>,
}

impl TestContext {
    pub async fn new() -> Self {
        // 内存库只能使用单个连接
        let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 30)
            .await
            .expect("in-memory database");
        Self::with_storage(Arc::new(storage), None).await
    }

    /// 使用临时文件库与连接池，事务之间会真实地并发竞争
    pub async fn file_backed(pool_size: u32) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("assessment.db").display());
        let storage = SeaOrmStorage::connect(&url, pool_size, 30)
            .await
            .expect("file database");
        Self::with_storage(Arc::new(storage), Some(dir)).await
    }

    async fn with_storage(storage: Arc<dyn Storage>, db_dir: Option<TempDir>) -> Self {
        let cache: Arc<dyn ObjectCache> =
            Arc::new(MokaCacheWrapper::with_settings(1000, 600).expect("moka cache"));

        let course = storage
            .create_course(CreateCourseRequest {
                title: "Software Engineering".to_string(),
                description: None,
            })
            .await
            .expect("course");

        let admin = Self::create_user(storage.as_ref(), "admin", UserRole::Admin).await;
        let instructor = Self::create_user(storage.as_ref(), "instructor", UserRole::User).await;
        let tutor = Self::create_user(storage.as_ref(), "tutor", UserRole::User).await;
        let tutor2 = Self::create_user(storage.as_ref(), "tutor2", UserRole::User).await;
        let student = Self::create_user(storage.as_ref(), "student", UserRole::User).await;
        let student2 = Self::create_user(storage.as_ref(), "student2", UserRole::User).await;
        let outsider = Self::create_user(storage.as_ref(), "outsider", UserRole::User).await;

        for (user, role) in [
            (&instructor, CourseRole::Instructor),
            (&tutor, CourseRole::Tutor),
            (&tutor2, CourseRole::Tutor),
            (&student, CourseRole::Student),
            (&student2, CourseRole::Student),
        ] {
            storage
                .upsert_course_user(course.id, user.id, role)
                .await
                .expect("course member");
        }

        let closed_exercise = Self::create_exercise(
            storage.as_ref(),
            course.id,
            ExerciseType::Modeling,
            Some(Utc::now() - Duration::days(1)),
        )
        .await;
        let open_exercise = Self::create_exercise(
            storage.as_ref(),
            course.id,
            ExerciseType::Modeling,
            Some(Utc::now() + Duration::days(1)),
        )
        .await;
        let text_exercise =
            Self::create_exercise(storage.as_ref(), course.id, ExerciseType::Text, None).await;

        Self {
            storage,
            cache,
            course,
            admin,
            instructor,
            tutor,
            tutor2,
            student,
            student2,
            outsider,
            closed_exercise,
            open_exercise,
            text_exercise,
            counter: AtomicUsize::new(0),
            _db_dir: db_dir,
        }
    }

    async fn create_user(storage: &dyn Storage, username: &str, role: UserRole) -> User {
        storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                display_name: None,
                role,
            })
            .await
            .expect("user")
    }

    async fn create_exercise(
        storage: &dyn Storage,
        course_id: i64,
        exercise_type: ExerciseType,
        due_date: Option<DateTime<Utc>>,
    ) -> Exercise {
        let modeling = exercise_type == ExerciseType::Modeling;
        storage
            .create_exercise(CreateExerciseRequest {
                course_id,
                title: format!("{exercise_type} exercise"),
                exercise_type,
                diagram_type: modeling.then_some(DiagramType::ClassDiagram),
                max_score: 10.0,
                due_date,
                grading_instructions: Some("Check classes and associations".to_string()),
                sample_solution_model: modeling.then(|| "{\"sample_solution\":true}".to_string()),
                sample_solution_explanation: Some("sample_solution explanation".to_string()),
            })
            .await
            .expect("exercise")
    }

    /// 在课程中创建一个建模练习
    pub async fn exercise_with_due_date(&self, due_date: Option<DateTime<Utc>>) -> Exercise {
        Self::create_exercise(
            self.storage.as_ref(),
            self.course.id,
            ExerciseType::Modeling,
            due_date,
        )
        .await
    }

    /// 创建一个新的课程学生
    pub async fn new_student(&self) -> User {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let user = Self::create_user(
            self.storage.as_ref(),
            &format!("learner{n}"),
            UserRole::User,
        )
        .await;
        self.storage
            .upsert_course_user(self.course.id, user.id, CourseRole::Student)
            .await
            .expect("course member");
        user
    }

    pub async fn participation(
        &self,
        exercise: &Exercise,
        student: &User,
        initialization_date: DateTime<Utc>,
    ) -> Participation {
        self.storage
            .create_participation(Some(exercise.id), student.id, initialization_date)
            .await
            .expect("participation")
    }

    /// 为学生创建参与记录（截止前两天开始）并写入提交，不经过截止时间检查
    pub async fn submission_for(
        &self,
        exercise: &Exercise,
        student: &User,
        submitted: bool,
    ) -> ModelingSubmission {
        let started = exercise.due_date.unwrap_or_else(Utc::now) - Duration::days(2);
        let participation = self.participation(exercise, student, started).await;
        self.storage
            .save_submission(
                participation.id,
                SubmissionContent {
                    model: Some("{\"elements\":[]}".to_string()),
                    explanation_text: None,
                    submitted,
                },
            )
            .await
            .expect("submission")
    }

    /// 由新学生创建一份提交
    pub async fn new_submission(&self, exercise: &Exercise, submitted: bool) -> ModelingSubmission {
        let student = self.new_student().await;
        self.submission_for(exercise, &student, submitted).await
    }

    pub fn token(&self, user: &User) -> String {
        JwtUtils::generate_access_token(user.id, &user.role.to_string()).expect("token")
    }

    pub fn storage_data(&self) -> web::Data<Arc<dyn Storage>> {
        web::Data::new(self.storage.clone())
    }

    pub fn cache_data(&self) -> web::Data<Arc<dyn ObjectCache>> {
        web::Data::new(self.cache.clone())
    }

    /// 注册共享数据与全部路由，用于 `App::configure`
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let storage = self.storage_data();
        let cache = self.cache_data();
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(storage)
                .app_data(cache);
            crate::routes::configure_routes(cfg);
        }
    }
}
