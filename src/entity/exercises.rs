//! 练习实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exercises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub exercise_type: String,
    pub diagram_type: Option<String>,
    pub max_score: f64,
    pub due_date: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub grading_instructions: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub sample_solution_model: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub sample_solution_explanation: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::participations::Entity")]
    Participations,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::participations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_exercise(self) -> crate::models::exercises::entities::Exercise {
        use crate::models::exercises::entities::{DiagramType, Exercise, ExerciseType};
        use chrono::{DateTime, Utc};

        Exercise {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            // 未知类型按文本练习处理，避免误入建模评审流程
            exercise_type: self
                .exercise_type
                .parse::<ExerciseType>()
                .unwrap_or(ExerciseType::Text),
            diagram_type: self
                .diagram_type
                .and_then(|d| d.parse::<DiagramType>().ok()),
            max_score: self.max_score,
            due_date: self
                .due_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            grading_instructions: self.grading_instructions,
            sample_solution_model: self.sample_solution_model,
            sample_solution_explanation: self.sample_solution_explanation,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
