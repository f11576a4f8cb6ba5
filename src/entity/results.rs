//! 评审结果实体
//!
//! assessor_id 非空且 completion_date 为空的行即为评审锁。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub submission_id: i64,
    pub participation_id: i64,
    pub assessor_id: Option<i64>,
    pub score: Option<f64>,
    pub rated: bool,
    pub completion_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssessorId",
        to = "super::users::Column::Id"
    )]
    Assessor,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::results::entities::AssessmentResult {
        use crate::models::results::entities::AssessmentResult;
        use chrono::{DateTime, Utc};

        AssessmentResult {
            id: self.id,
            submission_id: self.submission_id,
            participation_id: self.participation_id,
            assessor_id: self.assessor_id,
            score: self.score,
            rated: self.rated,
            completion_date: self
                .completion_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
