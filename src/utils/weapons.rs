use serde::{Deserialize, Serialize};

/// Known weapon slots. The replicated `weapon` field is a raw `i32` and may
/// hold values outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Unarmed,
    Pistol,
    Rifle,
}

impl Weapon {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Weapon::Unarmed),
            1 => Some(Weapon::Pistol),
            2 => Some(Weapon::Rifle),
            _ => None,
        }
    }
}
