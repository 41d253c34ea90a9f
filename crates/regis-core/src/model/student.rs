use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};

/// Student gender as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

/// Year level 1 through 4, serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum YearLevel {
    First,
    Second,
    Third,
    Fourth,
}

impl YearLevel {
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "1st Year",
            Self::Second => "2nd Year",
            Self::Third => "3rd Year",
            Self::Fourth => "4th Year",
        }
    }

    /// Recognize the year-level synonyms users type into the search box:
    /// "2", "2nd", "second", "2nd year", "second year" all mean [`Self::Second`].
    #[must_use]
    pub fn parse_synonym(query: &str) -> Option<Self> {
        let mut q = query.trim().to_lowercase();
        if let Some(stripped) = q.strip_suffix("year") {
            // "2nd year" yes, "2ndyear" no.
            if !stripped.is_empty() && !stripped.ends_with(char::is_whitespace) {
                return None;
            }
            q = stripped.trim_end().to_string();
        }
        match q.as_str() {
            "1" | "1st" | "first" => Some(Self::First),
            "2" | "2nd" | "second" => Some(Self::Second),
            "3" | "3rd" | "third" => Some(Self::Third),
            "4" | "4th" | "fourth" => Some(Self::Fourth),
            _ => None,
        }
    }
}

impl TryFrom<u8> for YearLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            other => Err(format!("year level must be 1-4, got {other}")),
        }
    }
}

impl From<YearLevel> for u8 {
    fn from(y: YearLevel) -> Self {
        y.number()
    }
}

impl fmt::Display for YearLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student record, keyed by the immutable `id_number` (`XXXX-XXXX`).
///
/// `program` is the display name the list endpoint joins in; write payloads
/// carry the ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id_number: String,
    pub last_name: String,
    pub first_name: String,
    pub gender: Gender,
    pub year_level: YearLevel,
    pub college_id: i64,
    pub program_id: i64,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Record for Student {
    const RESOURCE: &'static str = "students";
    const COLLECTION_FIELD: &'static str = "students";

    fn key(&self) -> String {
        self.id_number.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id_number" => Some(FieldValue::Text(self.id_number.clone())),
            "last_name" => Some(FieldValue::Text(self.last_name.clone())),
            "first_name" => Some(FieldValue::Text(self.first_name.clone())),
            "gender" => Some(FieldValue::Text(self.gender.to_string())),
            "year_level" => Some(FieldValue::Int(i64::from(self.year_level.number()))),
            "college_id" => Some(FieldValue::Int(self.college_id)),
            "program_id" => Some(FieldValue::Int(self.program_id)),
            "program" => self.program.clone().map(FieldValue::Text),
            _ => None,
        }
    }

    fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.first_name,
            self.last_name,
            self.id_number,
            self.program.as_deref().unwrap_or_default()
        )
    }

    /// Students special-case two query shapes before the generic substring
    /// match: year-level synonyms ("2nd year" matches every second-year
    /// student regardless of name) and exact gender tokens ("male" must not
    /// substring-match "Female").
    fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        if let Some(year) = YearLevel::parse_synonym(&needle) {
            return self.year_level == year;
        }
        if needle == "male" || needle == "female" {
            return self.gender.to_string().to_lowercase() == needle;
        }
        self.search_haystack().to_lowercase().contains(&needle)
    }
}
