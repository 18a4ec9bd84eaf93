/// Generation status shared by course module synthesis and lesson videos.
use serde::{Deserialize, Serialize};

/// Status enum matching the `generation_status` database type.
///
/// `Completed` and `Error` are terminal: only an explicit user retry
/// transitions a row back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Generating,
    Completed,
    Error,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Completed | GenerationStatus::Error)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStatus::Pending => write!(f, "pending"),
            GenerationStatus::Generating => write!(f, "generating"),
            GenerationStatus::Completed => write!(f, "completed"),
            GenerationStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(GenerationStatus::Pending),
            "generating" => Ok(GenerationStatus::Generating),
            "completed" => Ok(GenerationStatus::Completed),
            "error" => Ok(GenerationStatus::Error),
            _ => Err(format!("Invalid generation status: {}", s)),
        }
    }
}

/// Diesel-side mapping of the `generation_status` postgres enum.
#[derive(diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::GenerationStatus"]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatusDb {
    Pending,
    Generating,
    Completed,
    Error,
}

impl From<GenerationStatusDb> for GenerationStatus {
    fn from(db: GenerationStatusDb) -> Self {
        match db {
            GenerationStatusDb::Pending => GenerationStatus::Pending,
            GenerationStatusDb::Generating => GenerationStatus::Generating,
            GenerationStatusDb::Completed => GenerationStatus::Completed,
            GenerationStatusDb::Error => GenerationStatus::Error,
        }
    }
}

impl From<GenerationStatus> for GenerationStatusDb {
    fn from(status: GenerationStatus) -> Self {
        match status {
            GenerationStatus::Pending => GenerationStatusDb::Pending,
            GenerationStatus::Generating => GenerationStatusDb::Generating,
            GenerationStatus::Completed => GenerationStatusDb::Completed,
            GenerationStatus::Error => GenerationStatusDb::Error,
        }
    }
}
