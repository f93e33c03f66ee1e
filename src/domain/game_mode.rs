use serde::Deserialize;

use crate::state::character::{Character, CharacterState};

/// Starting values for every character the game mode spawns
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharacterTemplate {
    pub weapon: i32,
    pub health: i32,
    pub pistol_ammo: i32,
    pub rifle_ammo: i32,
    pub spawn_position: (f32, f32, f32),
}

impl Default for CharacterTemplate {
    fn default() -> Self {
        let state = CharacterState::default();
        Self {
            weapon: state.weapon,
            health: state.health,
            pistol_ammo: state.pistol_ammo,
            rifle_ammo: state.rifle_ammo,
            spawn_position: (0.0, 1.0, 0.0),
        }
    }
}

/// Picks the character every joining player is given
#[derive(Debug, Clone, Default)]
pub struct GameMode {
    template: CharacterTemplate,
}

impl GameMode {
    pub fn new(template: CharacterTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &CharacterTemplate {
        &self.template
    }

    /// Spawn an authoritative character from the template
    pub fn spawn_character(&self, id: u32, name: String) -> Character {
        let state = CharacterState {
            weapon: self.template.weapon,
            health: self.template.health,
            pistol_ammo: self.template.pistol_ammo,
            rifle_ammo: self.template.rifle_ammo,
            movement_locked: false,
        };

        let mut character = Character::authority(id, name, state);
        character.position = self.template.spawn_position;
        character
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spawn() {
        let mode = GameMode::default();
        let character = mode.spawn_character(1, "Player1".to_string());

        assert!(character.is_authority());
        assert_eq!(character.state(), &CharacterState::default());
        assert_eq!(character.position, (0.0, 1.0, 0.0));
    }

    #[test]
    fn test_custom_template() {
        let mode = GameMode::new(CharacterTemplate {
            weapon: 2,
            rifle_ammo: 30,
            ..CharacterTemplate::default()
        });
        let character = mode.spawn_character(9, "Rifleman".to_string());

        assert_eq!(character.state().weapon, 2);
        assert_eq!(character.state().rifle_ammo, 30);
        assert_eq!(character.state().pistol_ammo, 100);
    }
}
