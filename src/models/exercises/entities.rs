use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 练习类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exercise.ts")]
pub enum ExerciseType {
    Modeling,
    Text,
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseType::Modeling => write!(f, "modeling"),
            ExerciseType::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modeling" => Ok(ExerciseType::Modeling),
            "text" => Ok(ExerciseType::Text),
            _ => Err(format!("Invalid exercise type: {s}")),
        }
    }
}

// 建模练习的图类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "exercise.ts")]
pub enum DiagramType {
    ClassDiagram,
    ActivityDiagram,
    ObjectDiagram,
    UseCaseDiagram,
    CommunicationDiagram,
    ComponentDiagram,
    DeploymentDiagram,
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagramType::ClassDiagram => "class_diagram",
            DiagramType::ActivityDiagram => "activity_diagram",
            DiagramType::ObjectDiagram => "object_diagram",
            DiagramType::UseCaseDiagram => "use_case_diagram",
            DiagramType::CommunicationDiagram => "communication_diagram",
            DiagramType::ComponentDiagram => "component_diagram",
            DiagramType::DeploymentDiagram => "deployment_diagram",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DiagramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class_diagram" => Ok(DiagramType::ClassDiagram),
            "activity_diagram" => Ok(DiagramType::ActivityDiagram),
            "object_diagram" => Ok(DiagramType::ObjectDiagram),
            "use_case_diagram" => Ok(DiagramType::UseCaseDiagram),
            "communication_diagram" => Ok(DiagramType::CommunicationDiagram),
            "component_diagram" => Ok(DiagramType::ComponentDiagram),
            "deployment_diagram" => Ok(DiagramType::DeploymentDiagram),
            _ => Err(format!("Invalid diagram type: {s}")),
        }
    }
}

// 练习实体（包含全部字段，对外输出前需经过可见性过滤）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exercise.ts")]
pub struct Exercise {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub exercise_type: ExerciseType,
    pub diagram_type: Option<DiagramType>,
    pub max_score: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub grading_instructions: Option<String>,
    pub sample_solution_model: Option<String>,
    pub sample_solution_explanation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    pub fn is_modeling(&self) -> bool {
        self.exercise_type == ExerciseType::Modeling
    }

    /// 截止时间是否已过，没有截止时间的练习视为随时可评审
    pub fn is_due_date_over(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_none_or(|due| now > due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn exercise(due_date: Option<DateTime<Utc>>) -> Exercise {
        let now = Utc::now();
        Exercise {
            id: 1,
            course_id: 1,
            title: "UML".to_string(),
            exercise_type: ExerciseType::Modeling,
            diagram_type: Some(DiagramType::ClassDiagram),
            max_score: 10.0,
            due_date,
            grading_instructions: None,
            sample_solution_model: None,
            sample_solution_explanation: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_due_date_over() {
        let now = Utc::now();
        assert!(exercise(None).is_due_date_over(now));
        assert!(exercise(Some(now - Duration::hours(1))).is_due_date_over(now));
        assert!(!exercise(Some(now + Duration::hours(1))).is_due_date_over(now));
    }

    #[test]
    fn test_diagram_type_roundtrip_names() {
        assert_eq!(
            "use_case_diagram".parse::<DiagramType>(),
            Ok(DiagramType::UseCaseDiagram)
        );
        assert_eq!(DiagramType::ClassDiagram.to_string(), "class_diagram");
    }
}
