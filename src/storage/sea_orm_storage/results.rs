//! 评审结果与评审锁存储操作
//!
//! 评审锁 = assessor_id 为评审人且 completion_date 为空的结果行。

use super::SeaOrmStorage;
use crate::entity::results::{ActiveModel, Column, Entity as Results};
use crate::entity::submissions::Entity as Submissions;
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{AssessmentError, Result};
use crate::models::results::entities::{AssessmentResult, LockAcquisition};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, warn};

/// SQLite 写锁等待超时（SQLITE_BUSY）
fn is_busy(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("database is locked") || msg.contains("database table is locked")
}

/// 加锁事务中的数据库错误，写锁竞争按评审冲突处理
fn lock_txn_error(context: &str, err: DbErr) -> AssessmentError {
    if is_busy(&err) {
        warn!("Assessment lock transaction busy ({}): {}", context, err);
        AssessmentError::assessment_conflict(format!("评审锁正被其他请求占用，请稍后重试: {err}"))
    } else {
        AssessmentError::database_operation(format!("{context}: {err}"))
    }
}

impl SeaOrmStorage {
    /// 获取提交的评审结果
    pub async fn get_result_by_submission_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<AssessmentResult>> {
        let result = Results::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评审结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 统计评审人持有的锁
    pub async fn count_locks_by_assessor_impl(&self, assessor_id: i64) -> Result<u64> {
        Self::count_locks(&self.db, assessor_id).await
    }

    async fn count_locks<C: ConnectionTrait>(conn: &C, assessor_id: i64) -> Result<u64> {
        Results::find()
            .filter(Column::AssessorId.eq(assessor_id))
            .filter(Column::CompletionDate.is_null())
            .count(conn)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("统计评审锁失败: {e}")))
    }

    /// 列出评审人持有的锁
    pub async fn list_locks_by_assessor_impl(
        &self,
        assessor_id: i64,
    ) -> Result<Vec<AssessmentResult>> {
        let results = Results::find()
            .filter(Column::AssessorId.eq(assessor_id))
            .filter(Column::CompletionDate.is_null())
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评审锁失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_result()).collect())
    }

    /// 加评审锁
    ///
    /// 上限检查与结果创建在同一事务内完成。
    pub async fn acquire_assessment_lock_impl(
        &self,
        submission_id: i64,
        assessor_id: i64,
        lock_limit: u64,
    ) -> Result<LockAcquisition> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| lock_txn_error("开启事务失败", e))?;

        match Self::acquire_in_txn(&txn, submission_id, assessor_id, lock_limit).await {
            Ok(outcome) => {
                txn.commit()
                    .await
                    .map_err(|e| lock_txn_error("提交事务失败", e))?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(e) = txn.rollback().await {
                    warn!("Failed to roll back lock acquisition: {}", e);
                }
                Err(err)
            }
        }
    }

    async fn acquire_in_txn(
        txn: &DatabaseTransaction,
        submission_id: i64,
        assessor_id: i64,
        lock_limit: u64,
    ) -> Result<LockAcquisition> {
        // 锁住评审人所在行，串行化同一评审人的并发加锁
        if txn.get_database_backend() == DatabaseBackend::Sqlite {
            // SQLite 没有行锁。事务默认为 DEFERRED，先读后写时落后的快照无法升级为写锁，
            // 因此第一条语句就写入，在读取任何数据前拿到库级写锁（效果同 BEGIN IMMEDIATE），
            // 其余事务在 busy_timeout 内排队等待
            Users::update_many()
                .col_expr(UserColumn::UpdatedAt, Expr::col(UserColumn::UpdatedAt).into())
                .filter(UserColumn::Id.eq(assessor_id))
                .exec(txn)
                .await
                .map_err(|e| lock_txn_error("获取写锁失败", e))?;
        } else {
            Users::find_by_id(assessor_id)
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(|e| lock_txn_error("锁定评审人失败", e))?;
        }

        let submission = Submissions::find_by_id(submission_id)
            .one(txn)
            .await
            .map_err(|e| lock_txn_error("查询提交失败", e))?
            .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;

        let existing = Results::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .one(txn)
            .await
            .map_err(|e| lock_txn_error("查询评审结果失败", e))?;

        if let Some(model) = &existing {
            if model.completion_date.is_some() {
                return Ok(LockAcquisition::Finished(model.clone().into_result()));
            }
            match model.assessor_id {
                Some(id) if id == assessor_id => {
                    debug!(
                        "Assessor {} already holds lock on submission {}",
                        assessor_id, submission_id
                    );
                    return Ok(LockAcquisition::AlreadyHeld(model.clone().into_result()));
                }
                Some(other) => {
                    return Err(AssessmentError::assessment_conflict(format!(
                        "提交 {submission_id} 正在由评审人 {other} 评审"
                    )));
                }
                // 无评审人的未完成结果，允许认领
                None => {}
            }
        }

        let held = Self::count_locks(txn, assessor_id).await?;
        if held >= lock_limit {
            return Err(AssessmentError::lock_limit_exceeded(format!(
                "评审人已锁定 {held} 份提交，达到上限 {lock_limit}"
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let outcome = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.assessor_id = Set(Some(assessor_id));
                active.updated_at = Set(now);
                active
                    .update(txn)
                    .await
                    .map_err(|e| lock_txn_error("认领评审结果失败", e))?
            }
            None => {
                let model = ActiveModel {
                    submission_id: Set(submission_id),
                    participation_id: Set(submission.participation_id),
                    assessor_id: Set(Some(assessor_id)),
                    score: Set(None),
                    rated: Set(false),
                    completion_date: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(txn).await.map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        AssessmentError::assessment_conflict(format!(
                            "提交 {submission_id} 已被其他评审人锁定"
                        ))
                    }
                    _ => lock_txn_error("创建评审结果失败", e),
                })?
            }
        };

        Ok(LockAcquisition::Acquired(outcome.into_result()))
    }

    /// 保存评审分数
    ///
    /// 评审人只会被写入尚无评审人的结果，已有评审人时保持不变。
    pub async fn save_assessment_impl(
        &self,
        result_id: i64,
        assessor_id: i64,
        score: f64,
        submit: bool,
    ) -> Result<Option<AssessmentResult>> {
        let Some(model) = Results::find_by_id(result_id)
            .one(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("查询评审结果失败: {e}")))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let was_finished = model.completion_date.is_some();
        let has_assessor = model.assessor_id.is_some();

        let mut active: ActiveModel = model.into();
        active.score = Set(Some(score));
        active.updated_at = Set(now);
        if !has_assessor {
            active.assessor_id = Set(Some(assessor_id));
        }
        if submit {
            active.rated = Set(true);
            if !was_finished {
                active.completion_date = Set(Some(now));
            }
        }

        let result = active
            .update(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("保存评审失败: {e}")))?;

        Ok(Some(result.into_result()))
    }

    /// 取消评审：删除未完成的结果
    pub async fn cancel_assessment_impl(&self, result_id: i64) -> Result<bool> {
        let result = Results::delete_many()
            .filter(Column::Id.eq(result_id))
            .filter(Column::CompletionDate.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| AssessmentError::database_operation(format!("取消评审失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
