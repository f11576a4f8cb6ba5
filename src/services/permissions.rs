//! 课程权限判断
//!
//! 每个操作开始时显式调用，失败时返回 `Forbidden`。
//! 管理员视为所有课程的教师。

use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 获取用户在课程中的有效角色
pub async fn course_role(
    storage: &dyn Storage,
    user: &User,
    course_id: i64,
) -> Result<Option<CourseRole>> {
    if user.is_admin() {
        return Ok(Some(CourseRole::Instructor));
    }

    Ok(storage
        .get_course_user(course_id, user.id)
        .await?
        .map(|member| member.role))
}

/// 要求用户在课程中至少具备 `required` 角色
pub async fn require_course_role(
    storage: &dyn Storage,
    user: &User,
    course_id: i64,
    required: CourseRole,
) -> Result<CourseRole> {
    match course_role(storage, user, course_id).await? {
        Some(role) if role.at_least(required) => Ok(role),
        Some(role) => Err(AssessmentError::forbidden(format!(
            "课程 {course_id} 中的角色 {role} 无权执行此操作，需要 {required}"
        ))),
        None => Err(AssessmentError::forbidden(format!(
            "您不是课程 {course_id} 的成员"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_role_hierarchy() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        let role = require_course_role(storage, &ctx.instructor, ctx.course.id, CourseRole::Tutor)
            .await
            .unwrap();
        assert_eq!(role, CourseRole::Instructor);

        let err = require_course_role(storage, &ctx.student, ctx.course.id, CourseRole::Tutor)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        let err = require_course_role(storage, &ctx.outsider, ctx.course.id, CourseRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_bypasses_membership() {
        let ctx = TestContext::new().await;
        let role = course_role(ctx.storage.as_ref(), &ctx.admin, ctx.course.id)
            .await
            .unwrap();
        assert_eq!(role, Some(CourseRole::Instructor));
    }
}
