use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};

/// A college record as served by `/api/dashboard/colleges`.
///
/// `num_programs` and `num_students` are server-computed rollups; list
/// payloads from older backend revisions omit them, hence the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub id: i64,
    pub college_code: String,
    pub college_name: String,
    #[serde(default)]
    pub num_programs: u32,
    #[serde(default)]
    pub num_students: u32,
}

impl Record for College {
    const RESOURCE: &'static str = "colleges";
    const COLLECTION_FIELD: &'static str = "colleges";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Int(self.id)),
            "college_code" => Some(FieldValue::Text(self.college_code.clone())),
            "college_name" => Some(FieldValue::Text(self.college_name.clone())),
            "num_programs" => Some(FieldValue::Int(i64::from(self.num_programs))),
            "num_students" => Some(FieldValue::Int(i64::from(self.num_students))),
            _ => None,
        }
    }

    fn search_haystack(&self) -> String {
        format!("{} {}", self.college_code, self.college_name)
    }
}
