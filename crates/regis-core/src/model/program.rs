use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};

/// An academic program offered by a college.
///
/// `college_id` must reference an existing [`super::College`]; the form
/// layer enforces this by only offering programs of the selected college,
/// and the server re-validates on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub program_code: String,
    pub program_name: String,
    pub college_id: i64,
    #[serde(default)]
    pub college_name: String,
    #[serde(default)]
    pub num_students: u32,
}

impl Record for Program {
    const RESOURCE: &'static str = "programs";
    const COLLECTION_FIELD: &'static str = "programs";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Int(self.id)),
            "program_code" => Some(FieldValue::Text(self.program_code.clone())),
            "program_name" => Some(FieldValue::Text(self.program_name.clone())),
            "college_id" => Some(FieldValue::Int(self.college_id)),
            "college_name" => Some(FieldValue::Text(self.college_name.clone())),
            "num_students" => Some(FieldValue::Int(i64::from(self.num_students))),
            _ => None,
        }
    }

    fn search_haystack(&self) -> String {
        format!(
            "{} {} {}",
            self.program_code, self.program_name, self.college_name
        )
    }
}
