//! 课程与课程成员存储操作

use super::SeaOrmStorage;
use crate::entity::course_users::{
    ActiveModel as CourseUserActiveModel, Column as CourseUserColumn, Entity as CourseUsers,
};
use crate::entity::courses::ActiveModel;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::{
    entities::{Course, CourseRole, CourseUser},
    requests::CreateCourseRequest,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 添加课程成员，已存在时更新角色
    pub async fn upsert_course_user_impl(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser> {
        let existing = CourseUsers::find()
            .filter(
                Condition::all()
                    .add(CourseUserColumn::CourseId.eq(course_id))
                    .add(CourseUserColumn::UserId.eq(user_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询课程成员失败: {e}")))?;

        let result = match existing {
            Some(model) => {
                let mut active: CourseUserActiveModel = model.into();
                active.role = Set(role.to_string());
                active.update(&self.db).await.map_err(|e| {
                    AssessmentError::database_operation(format!("更新课程成员失败: {e}"))
                })?
            }
            None => CourseUserActiveModel {
                course_id: Set(course_id),
                user_id: Set(user_id),
                role: Set(role.to_string()),
                joined_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("添加课程成员失败: {e}")))?,
        };

        Ok(result.into_course_user())
    }

    /// 获取用户在课程中的成员信息
    pub async fn get_course_user_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseUser>> {
        let result = CourseUsers::find()
            .filter(CourseUserColumn::CourseId.eq(course_id))
            .filter(CourseUserColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询课程成员失败: {e}")))?;

        Ok(result.map(|m| m.into_course_user()))
    }
}
