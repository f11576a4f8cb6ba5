//! 练习存储操作

use super::SeaOrmStorage;
use crate::entity::exercises::{ActiveModel, Entity as Exercises};
use crate::errors::{AssessmentError, Result};
use crate::models::exercises::{entities::Exercise, requests::CreateExerciseRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建练习
    pub async fn create_exercise_impl(&self, req: CreateExerciseRequest) -> Result<Exercise> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title),
            exercise_type: Set(req.exercise_type.to_string()),
            diagram_type: Set(req.diagram_type.map(|d| d.to_string())),
            max_score: Set(req.max_score),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            grading_instructions: Set(req.grading_instructions),
            sample_solution_model: Set(req.sample_solution_model),
            sample_solution_explanation: Set(req.sample_solution_explanation),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("创建练习失败: {e}")))?;

        Ok(result.into_exercise())
    }

    /// 通过 ID 获取练习
    pub async fn get_exercise_by_id_impl(&self, exercise_id: i64) -> Result<Option<Exercise>> {
        let result = Exercises::find_by_id(exercise_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询练习失败: {e}")))?;

        Ok(result.map(|m| m.into_exercise()))
    }
}
