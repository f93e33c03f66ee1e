use crate::domain::dispatcher::{self, AuthorityLink, Dispatch};
use crate::state::character::Character;

/// Discrete player intents coming out of the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIntent {
    SwitchSlot0,
    SwitchSlot1,
    SwitchSlot2,
    FirePressed,
    FireReleased,
}

impl InputIntent {
    /// Weapon slot selected by this intent, if it is a switch
    pub fn slot(self) -> Option<i32> {
        match self {
            InputIntent::SwitchSlot0 => Some(0),
            InputIntent::SwitchSlot1 => Some(1),
            InputIntent::SwitchSlot2 => Some(2),
            InputIntent::FirePressed | InputIntent::FireReleased => None,
        }
    }
}

/// Route an intent to the matching dispatcher entry point. Releasing fire
/// dispatches nothing.
pub fn handle_intent<L: AuthorityLink + ?Sized>(
    character: &mut Character,
    link: &L,
    intent: InputIntent,
) -> Option<Dispatch> {
    if let Some(slot) = intent.slot() {
        return Some(dispatcher::request_switch_weapon(character, link, slot));
    }

    match intent {
        InputIntent::FirePressed => Some(dispatcher::request_fire(character, link)),
        _ => {
            dispatcher::release_fire(character);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dispatcher::RequestedAction;
    use crate::state::character::CharacterState;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLink(RefCell<Vec<RequestedAction>>);

    impl AuthorityLink for RecordingLink {
        fn send(&self, _character_id: u32, action: RequestedAction) {
            self.0.borrow_mut().push(action);
        }
    }

    #[test]
    fn test_intents_on_observer() {
        let link = RecordingLink::default();
        let mut character = Character::observer(1, "Obs".to_string(), CharacterState::default());

        assert_eq!(handle_intent(&mut character, &link, InputIntent::SwitchSlot2), Some(Dispatch::Forwarded));
        assert_eq!(handle_intent(&mut character, &link, InputIntent::FirePressed), Some(Dispatch::Forwarded));
        assert_eq!(handle_intent(&mut character, &link, InputIntent::FireReleased), None);

        assert_eq!(*link.0.borrow(), vec![RequestedAction::SwitchWeapon(2), RequestedAction::Fire]);
    }

    #[test]
    fn test_intents_on_authority() {
        let link = RecordingLink::default();
        let mut character = Character::authority(1, "Host".to_string(), CharacterState::default());

        handle_intent(&mut character, &link, InputIntent::SwitchSlot1);
        handle_intent(&mut character, &link, InputIntent::FirePressed);

        assert_eq!(character.state().weapon, 1);
        assert_eq!(character.state().pistol_ammo, 99);
        assert!(link.0.borrow().is_empty());
    }
}
