use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程内角色，按权限从低到高排序
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseRole {
    Student,    // 学生
    Tutor,      // 助教，可评审
    Instructor, // 教师
}

impl CourseRole {
    pub const STUDENT: &'static str = "student";
    pub const TUTOR: &'static str = "tutor";
    pub const INSTRUCTOR: &'static str = "instructor";

    /// 是否至少具备 `required` 角色的权限
    pub fn at_least(&self, required: CourseRole) -> bool {
        *self >= required
    }
}

impl<'de> Deserialize<'de> for CourseRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<CourseRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的课程角色: '{s}'. 支持的角色: student, tutor, instructor"
            ))
        })
    }
}

impl std::fmt::Display for CourseRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseRole::Student => write!(f, "{}", CourseRole::STUDENT),
            CourseRole::Tutor => write!(f, "{}", CourseRole::TUTOR),
            CourseRole::Instructor => write!(f, "{}", CourseRole::INSTRUCTOR),
        }
    }
}

impl std::str::FromStr for CourseRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CourseRole::STUDENT => Ok(CourseRole::Student),
            CourseRole::TUTOR => Ok(CourseRole::Tutor),
            CourseRole::INSTRUCTOR => Ok(CourseRole::Instructor),
            _ => Err(format!("Invalid course role: {s}")),
        }
    }
}

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 课程成员
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseUser {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: CourseRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(CourseRole::Instructor.at_least(CourseRole::Tutor));
        assert!(CourseRole::Tutor.at_least(CourseRole::Tutor));
        assert!(!CourseRole::Student.at_least(CourseRole::Tutor));
        assert!(!CourseRole::Tutor.at_least(CourseRole::Instructor));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("tutor".parse::<CourseRole>(), Ok(CourseRole::Tutor));
        assert!("teacher".parse::<CourseRole>().is_err());
        assert_eq!(CourseRole::Instructor.to_string(), "instructor");
    }
}
