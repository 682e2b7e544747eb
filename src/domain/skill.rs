use serde::{Deserialize, Serialize};

string_id!(SkillId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}
