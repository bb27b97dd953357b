//! Bindings and the merge rules that fold a freshly captured key into them
//!
//! A stick direction pair (left/right, up/down) is stored as one
//! parameterized key specification: `axis(0-,0+)` binds "left" to slot 0 and
//! "right" to slot 1 of the same binding. Capturing one side seeds the other
//! side with the complementary value until it is bound explicitly.

use super::keyspec::{KeyKind, KeySpec, Value};
use tracing::{debug, warn};

/// Which part of a binding a control edits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// The control owns the whole key list
    Whole,
    /// The control edits one slot of a shared parameterized binding
    Slot(usize),
}

impl Parameter {
    /// Whether this control is the one that loads the binding from the store.
    ///
    /// Slot 0 stands in for all slots of a shared binding so the same
    /// config name is fetched only once.
    pub fn loads_binding(self) -> bool {
        matches!(self, Parameter::Whole | Parameter::Slot(0))
    }
}

/// A UI control and the binding it edits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonMapping {
    pub config_name: &'static str,
    pub parameter: Parameter,
}

impl ButtonMapping {
    pub const fn whole(config_name: &'static str) -> Self {
        Self {
            config_name,
            parameter: Parameter::Whole,
        }
    }

    pub const fn slot(config_name: &'static str, slot: usize) -> Self {
        Self {
            config_name,
            parameter: Parameter::Slot(slot),
        }
    }
}

/// Index of a control in [`BUTTON_MAPPINGS`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlId(pub usize);

/// The fixed control table of the N64 input dialog
pub const BUTTON_MAPPINGS: [ButtonMapping; 20] = [
    ButtonMapping::slot("X Axis", 0),
    ButtonMapping::slot("X Axis", 1),
    ButtonMapping::slot("Y Axis", 0),
    ButtonMapping::slot("Y Axis", 1),
    ButtonMapping::whole("A Button"),
    ButtonMapping::whole("B Button"),
    ButtonMapping::whole("Start"),
    ButtonMapping::whole("L Trig"),
    ButtonMapping::whole("R Trig"),
    ButtonMapping::whole("Z Trig"),
    ButtonMapping::whole("C Button U"),
    ButtonMapping::whole("C Button D"),
    ButtonMapping::whole("C Button L"),
    ButtonMapping::whole("C Button R"),
    ButtonMapping::whole("DPad U"),
    ButtonMapping::whole("DPad D"),
    ButtonMapping::whole("DPad L"),
    ButtonMapping::whole("DPad R"),
    ButtonMapping::whole("Mempak switch"),
    ButtonMapping::whole("Rumblepak switch"),
];

/// A logical controller input and its key specifications
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub config_name: String,
    pub keys: Vec<KeySpec>,
}

impl Binding {
    pub fn new(config_name: impl Into<String>, keys: Vec<KeySpec>) -> Self {
        Self {
            config_name: config_name.into(),
            keys,
        }
    }
}

/// Folds a single-value `key` into `keys`.
///
/// - [`Parameter::Whole`] replaces the key list.
/// - [`Parameter::Slot`] on an empty list or a different kind starts a new
///   parameterized key with at least two slots, every slot pre-filled with the
///   complement of the captured value.
/// - [`Parameter::Slot`] on the same kind keeps the existing slots, growing
///   with blank values when needed.
pub fn merge_key(keys: &mut Vec<KeySpec>, key: &KeySpec, parameter: Parameter) {
    let Some(&captured) = key.values.first() else {
        warn!("Ignoring captured key without a value: {:?}", key);
        return;
    };

    let slot = match parameter {
        Parameter::Whole => {
            debug!("Replacing binding with {}", key);
            *keys = vec![key.clone()];
            return;
        }
        Parameter::Slot(slot) => slot,
    };

    let same_kind = keys.first().is_some_and(|first| first.kind == key.kind);
    match keys.first_mut() {
        Some(first) if same_kind => {
            if first.values.len() <= slot {
                first.values.resize(slot + 1, Value::BLANK);
            }
            first.values[slot] = captured;
        }
        _ => {
            let count = (slot + 1).max(2);
            let filler = complement(key.kind, &captured);
            let mut values = vec![filler; count];
            values[slot] = captured;
            *keys = vec![KeySpec {
                kind: key.kind,
                values,
            }];
        }
    }
    keys.truncate(1);
    debug!("Merged {} into slot {}: {:?}", key, slot, keys);
}

/// Default for the other slots of a new parameterized key
fn complement(kind: KeyKind, value: &Value) -> Value {
    match kind {
        KeyKind::Axis => value.inverted_sign(),
        KeyKind::Hat => value.inverted_direction(),
        KeyKind::Button | KeyKind::Key => Value::BLANK,
    }
}

/// Reduces a binding to what a control shows.
///
/// For a slot control every key is narrowed to that slot. If any key lacks the
/// slot or has it unbound, the whole projection is empty.
pub fn project(keys: &[KeySpec], parameter: Parameter) -> Vec<KeySpec> {
    let slot = match parameter {
        Parameter::Whole => return keys.to_vec(),
        Parameter::Slot(slot) => slot,
    };

    let mut projected = Vec::with_capacity(keys.len());
    for key in keys {
        match key.values.get(slot) {
            Some(value) if !value.is_blank() => {
                projected.push(KeySpec::new(key.kind, *value));
            }
            Some(_) => return Vec::new(),
            None => {
                warn!("Parameter {} not found in {}", slot, key);
                return Vec::new();
            }
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::keyspec::{parse_all, serialize_all, Direction, Sign};

    fn merged(keys: &[KeySpec], key: KeySpec, parameter: Parameter) -> Vec<KeySpec> {
        let mut keys = keys.to_vec();
        merge_key(&mut keys, &key, parameter);
        keys
    }

    #[test]
    fn whole_replaces_everything() {
        let existing = vec![KeySpec {
            kind: KeyKind::Axis,
            values: vec![Value::axis(0, Sign::Minus), Value::axis(0, Sign::Plus)],
        }];
        let keys = merged(&existing, KeySpec::button(2), Parameter::Whole);
        assert_eq!(keys, vec![KeySpec::button(2)]);
    }

    #[test]
    fn captured_value_projects_back_unchanged() {
        let captures = [
            KeySpec::button(7),
            KeySpec::key(97),
            KeySpec::axis(1, Sign::Plus),
            KeySpec::hat(0, Direction::Left),
        ];
        let parameters = [Parameter::Whole, Parameter::Slot(0), Parameter::Slot(1)];
        for key in &captures {
            for parameter in parameters {
                let keys = merged(&[], key.clone(), parameter);
                assert_eq!(project(&keys, parameter), vec![key.clone()], "{key} {parameter:?}");
            }
        }
    }

    #[test]
    fn merged_bindings_survive_reparse() {
        let captures = [
            KeySpec::button(7),
            KeySpec::key(97),
            KeySpec::axis(2, Sign::Minus),
            KeySpec::hat(1, Direction::Left),
        ];
        for key in &captures {
            let existing = merged(&[], key.clone(), Parameter::Slot(1));
            let outcomes = [
                merged(&existing, key.clone(), Parameter::Whole),
                merged(&[], key.clone(), Parameter::Slot(3)),
                merged(&existing, key.clone(), Parameter::Slot(3)),
                merged(&[KeySpec::key(5), KeySpec::button(1)], key.clone(), Parameter::Slot(2)),
            ];
            for keys in outcomes {
                let text = serialize_all(&keys);
                assert_eq!(parse_all(&text), keys, "{text}");
            }
        }
    }

    #[test]
    fn grown_slots_are_written_as_unbound() {
        let existing = merged(&[], KeySpec::key(5), Parameter::Whole);
        let keys = merged(&existing, KeySpec::key(97), Parameter::Slot(3));
        assert_eq!(serialize_all(&keys), "key(5,_,_,97)");
        assert_eq!(parse_all("key(5,_,_,97)"), keys);
    }

    #[test]
    fn new_axis_binding_seeds_opposite_sign() {
        let keys = merged(&[], KeySpec::axis(0, Sign::Plus), Parameter::Slot(0));
        assert_eq!(
            keys,
            vec![KeySpec {
                kind: KeyKind::Axis,
                values: vec![Value::axis(0, Sign::Plus), Value::axis(0, Sign::Minus)],
            }]
        );
    }

    #[test]
    fn new_hat_binding_seeds_opposite_direction() {
        let keys = merged(&[], KeySpec::hat(1, Direction::Down), Parameter::Slot(1));
        assert_eq!(
            keys[0].values,
            vec![Value::hat(1, Direction::Up), Value::hat(1, Direction::Down)]
        );
    }

    #[test]
    fn buttons_and_keys_seed_blank_slots() {
        for key in [KeySpec::button(3), KeySpec::key(13)] {
            let keys = merged(&[], key.clone(), Parameter::Slot(0));
            assert_eq!(keys[0].values, vec![key.values[0], Value::BLANK]);
            assert!(keys[0]
                .values
                .iter()
                .all(|v| v.sign == Sign::None && v.direction == Direction::None));
        }
    }

    #[test]
    fn slot_beyond_two_sizes_the_new_binding() {
        let keys = merged(&[], KeySpec::axis(4, Sign::Minus), Parameter::Slot(3));
        assert_eq!(keys[0].values.len(), 4);
        assert_eq!(keys[0].values[0], Value::axis(4, Sign::Plus));
        assert_eq!(keys[0].values[3], Value::axis(4, Sign::Minus));
    }

    #[test]
    fn kind_change_starts_over() {
        let existing = merged(&[], KeySpec::axis(0, Sign::Minus), Parameter::Slot(0));
        let keys = merged(&existing, KeySpec::hat(0, Direction::Right), Parameter::Slot(1));
        assert_eq!(
            keys[0].values,
            vec![Value::hat(0, Direction::Left), Value::hat(0, Direction::Right)]
        );
    }

    #[test]
    fn same_kind_keeps_other_slot() {
        let existing = merged(&[], KeySpec::axis(0, Sign::Minus), Parameter::Slot(0));
        let keys = merged(&existing, KeySpec::axis(3, Sign::Minus), Parameter::Slot(1));
        assert_eq!(
            keys[0].values,
            vec![Value::axis(0, Sign::Minus), Value::axis(3, Sign::Minus)]
        );
    }

    #[test]
    fn growth_fills_blank_not_inverted() {
        let existing = merged(&[], KeySpec::axis(0, Sign::Minus), Parameter::Slot(0));
        let keys = merged(&existing, KeySpec::axis(1, Sign::Plus), Parameter::Slot(3));
        assert_eq!(
            keys[0].values,
            vec![
                Value::axis(0, Sign::Minus),
                Value::axis(0, Sign::Plus),
                Value::BLANK,
                Value::axis(1, Sign::Plus),
            ]
        );
    }

    #[test]
    fn projection_of_blank_or_missing_slot_is_unbound() {
        let keys = vec![KeySpec {
            kind: KeyKind::Button,
            values: vec![Value::plain(2), Value::BLANK],
        }];
        assert!(project(&keys, Parameter::Slot(1)).is_empty());
        assert!(project(&keys, Parameter::Slot(5)).is_empty());
        assert_eq!(project(&keys, Parameter::Slot(0)), vec![KeySpec::button(2)]);
    }

    #[test]
    fn only_whole_and_first_slot_load() {
        assert!(Parameter::Whole.loads_binding());
        assert!(Parameter::Slot(0).loads_binding());
        assert!(!Parameter::Slot(1).loads_binding());
    }
}
