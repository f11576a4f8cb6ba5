//! 建模提交存储操作

use super::SeaOrmStorage;
use crate::entity::participations::{Column as ParticipationColumn, Entity as Participations};
use crate::entity::results::{Column as ResultColumn, Entity as Results};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions, Model};
use crate::errors::{AssessmentError, Result};
use crate::models::modeling_submissions::entities::ModelingSubmission;
use crate::storage::{SubmissionContent, SubmissionFilter};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

impl SeaOrmStorage {
    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<ModelingSubmission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取参与记录的提交
    pub async fn get_submission_by_participation_id_impl(
        &self,
        participation_id: i64,
    ) -> Result<Option<ModelingSubmission>> {
        let result = self.find_submission_model(participation_id).await?;
        Ok(result.map(|m| m.into_submission()))
    }

    async fn find_submission_model(&self, participation_id: i64) -> Result<Option<Model>> {
        Submissions::find()
            .filter(Column::ParticipationId.eq(participation_id))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交失败: {e}")))
    }

    /// 写入提交：不存在则创建，存在则替换内容
    pub async fn save_submission_impl(
        &self,
        participation_id: i64,
        content: SubmissionContent,
    ) -> Result<ModelingSubmission> {
        if let Some(existing) = self.find_submission_model(participation_id).await? {
            return self.replace_submission_content(existing, content).await;
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            participation_id: Set(participation_id),
            model: Set(content.model.clone()),
            explanation_text: Set(content.explanation_text.clone()),
            submitted: Set(content.submitted),
            submission_date: Set(content.submitted.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(result.into_submission()),
            // 并发创建时另一请求已写入，改为替换内容
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = self
                    .find_submission_model(participation_id)
                    .await?
                    .ok_or_else(|| {
                        AssessmentError::database_operation(format!("创建提交失败: {e}"))
                    })?;
                self.replace_submission_content(existing, content).await
            }
            Err(e) => Err(AssessmentError::database_operation(format!(
                "创建提交失败: {e}"
            ))),
        }
    }

    async fn replace_submission_content(
        &self,
        existing: Model,
        content: SubmissionContent,
    ) -> Result<ModelingSubmission> {
        let now = chrono::Utc::now().timestamp();
        let previous_date = existing.submission_date;

        let mut active: ActiveModel = existing.into();
        active.model = Set(content.model);
        active.explanation_text = Set(content.explanation_text);
        active.submitted = Set(content.submitted);
        active.submission_date = Set(if content.submitted {
            Some(now)
        } else {
            previous_date
        });
        active.updated_at = Set(now);

        let result = active
            .update(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("更新提交失败: {e}")))?;

        Ok(result.into_submission())
    }

    /// 列出练习下的提交
    pub async fn list_submissions_by_exercise_impl(
        &self,
        exercise_id: i64,
        filter: SubmissionFilter,
    ) -> Result<Vec<ModelingSubmission>> {
        let mut select = Submissions::find()
            .inner_join(Participations)
            .filter(ParticipationColumn::ExerciseId.eq(exercise_id));

        if filter.submitted_only {
            select = select.filter(Column::Submitted.eq(true));
        }

        if let Some(assessor_id) = filter.assessed_by {
            select = select
                .inner_join(Results)
                .filter(ResultColumn::AssessorId.eq(assessor_id));
        }

        let results = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 已提交且尚无评审结果的提交，按提交时间排序
    pub async fn list_unassessed_submission_ids_impl(
        &self,
        exercise_id: i64,
        limit: Option<u64>,
    ) -> Result<Vec<i64>> {
        let mut select = Submissions::find()
            .select_only()
            .column(Column::Id)
            .inner_join(Participations)
            .left_join(Results)
            .filter(ParticipationColumn::ExerciseId.eq(exercise_id))
            .filter(Column::Submitted.eq(true))
            .filter(ResultColumn::Id.is_null())
            .order_by_asc(Column::SubmissionDate)
            .order_by_asc(Column::Id);

        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        select
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询待评审提交失败: {e}")))
    }
}
