//! 参与记录存储操作

use super::SeaOrmStorage;
use crate::entity::participations::{ActiveModel, Column, Entity as Participations};
use crate::errors::{AssessmentError, Result};
use crate::models::participations::entities::Participation;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};

impl SeaOrmStorage {
    /// 创建参与记录，同一学生与练习已有记录时返回已有记录
    pub async fn create_participation_impl(
        &self,
        exercise_id: Option<i64>,
        student_id: i64,
        initialization_date: DateTime<Utc>,
    ) -> Result<Participation> {
        let model = ActiveModel {
            exercise_id: Set(exercise_id),
            student_id: Set(student_id),
            initialization_date: Set(initialization_date.timestamp()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(result.into_participation()),
            // 并发开始同一练习时另一请求已写入，返回已有记录
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = match exercise_id {
                    Some(exercise_id) => {
                        self.get_participation_by_exercise_and_student_impl(exercise_id, student_id)
                            .await?
                    }
                    None => None,
                };
                existing.ok_or_else(|| {
                    AssessmentError::database_operation(format!("创建参与记录失败: {e}"))
                })
            }
            Err(e) => Err(AssessmentError::database_operation(format!(
                "创建参与记录失败: {e}"
            ))),
        }
    }

    /// 通过 ID 获取参与记录
    pub async fn get_participation_by_id_impl(
        &self,
        participation_id: i64,
    ) -> Result<Option<Participation>> {
        let result = Participations::find_by_id(participation_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询参与记录失败: {e}")))?;

        Ok(result.map(|m| m.into_participation()))
    }

    /// 获取学生在某练习下最早的参与记录
    pub async fn get_participation_by_exercise_and_student_impl(
        &self,
        exercise_id: i64,
        student_id: i64,
    ) -> Result<Option<Participation>> {
        let result = Participations::find()
            .filter(Column::ExerciseId.eq(exercise_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询参与记录失败: {e}")))?;

        Ok(result.map(|m| m.into_participation()))
    }
}
