//! Text codec for key specifications
//!
//! A binding is stored as a space separated list of tokens. Each token names
//! the input kind and carries one value per slot:
//!
//! ```text
//! button(3)            key(97)
//! axis(0-,0+)          hat(0:up,0:down)
//! axis(1+,_,1-)        "_" marks an unbound slot
//! ```
//!
//! Parsing never fails. The first token that cannot be recognized ends the
//! list and everything after it is dropped.

use std::fmt;

/// Direction of an axis value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sign {
    #[default]
    None,
    Plus,
    Minus,
}

impl Sign {
    pub fn inverted(self) -> Self {
        match self {
            Sign::None => Sign::None,
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }
}

/// Cardinal state of a hat switch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn inverted(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Direction::None => "",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Physical input family a key specification refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Button,
    Axis,
    Hat,
    Key,
}

impl KeyKind {
    fn as_str(self) -> &'static str {
        match self {
            KeyKind::Button => "button",
            KeyKind::Axis => "axis",
            KeyKind::Hat => "hat",
            KeyKind::Key => "key",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s {
            "button" => Some(KeyKind::Button),
            "axis" => Some(KeyKind::Axis),
            "hat" => Some(KeyKind::Hat),
            "key" => Some(KeyKind::Key),
            _ => None,
        }
    }
}

/// One slot of a key specification
///
/// `sign` only carries meaning for [`KeyKind::Axis`] and `direction` only for
/// [`KeyKind::Hat`]. A negative `number` is the unbound sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    pub number: i32,
    pub sign: Sign,
    pub direction: Direction,
}

impl Default for Value {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Value {
    pub const BLANK: Value = Value {
        number: -1,
        sign: Sign::None,
        direction: Direction::None,
    };

    pub fn plain(number: i32) -> Self {
        Self {
            number,
            ..Self::BLANK
        }
    }

    pub fn axis(number: i32, sign: Sign) -> Self {
        Self {
            number,
            sign,
            direction: Direction::None,
        }
    }

    pub fn hat(number: i32, direction: Direction) -> Self {
        Self {
            number,
            sign: Sign::None,
            direction,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.number < 0
    }

    pub fn inverted_sign(&self) -> Self {
        Self {
            sign: self.sign.inverted(),
            ..*self
        }
    }

    pub fn inverted_direction(&self) -> Self {
        Self {
            direction: self.direction.inverted(),
            ..*self
        }
    }

    fn write_slot(&self, kind: KeyKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            return f.write_str("_");
        }
        write!(f, "{}", self.number)?;
        match kind {
            KeyKind::Axis => match self.sign {
                Sign::Plus => f.write_str("+"),
                Sign::Minus => f.write_str("-"),
                Sign::None => Ok(()),
            },
            KeyKind::Hat if self.direction != Direction::None => {
                write!(f, ":{}", self.direction.as_str())
            }
            _ => Ok(()),
        }
    }

    fn parse_slot(kind: KeyKind, slot: &str) -> Option<Self> {
        if slot == "_" {
            return Some(Self::BLANK);
        }
        let digits_end = slot
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(slot.len());
        if digits_end == 0 {
            return None;
        }
        let number: i32 = slot[..digits_end].parse().ok()?;
        let suffix = &slot[digits_end..];

        match kind {
            KeyKind::Button | KeyKind::Key if suffix.is_empty() => Some(Self::plain(number)),
            KeyKind::Axis => match suffix {
                "+" => Some(Self::axis(number, Sign::Plus)),
                "-" => Some(Self::axis(number, Sign::Minus)),
                _ => None,
            },
            KeyKind::Hat => {
                let dir = suffix.strip_prefix(':')?;
                Direction::from_name(dir).map(|d| Self::hat(number, d))
            }
            _ => None,
        }
    }
}

/// A symbolic input binding: one kind and one or more value slots
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub kind: KeyKind,
    pub values: Vec<Value>,
}

impl KeySpec {
    pub fn new(kind: KeyKind, value: Value) -> Self {
        Self {
            kind,
            values: vec![value],
        }
    }

    pub fn button(number: i32) -> Self {
        Self::new(KeyKind::Button, Value::plain(number))
    }

    pub fn key(code: i32) -> Self {
        Self::new(KeyKind::Key, Value::plain(code))
    }

    pub fn axis(number: i32, sign: Sign) -> Self {
        Self::new(KeyKind::Axis, Value::axis(number, sign))
    }

    pub fn hat(number: i32, direction: Direction) -> Self {
        Self::new(KeyKind::Hat, Value::hat(number, direction))
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.as_str())?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            value.write_slot(self.kind, f)?;
        }
        f.write_str(")")
    }
}

/// Consumes one token from the front of `input`.
///
/// Returns the parsed key specification and the unconsumed remainder, or
/// `None` when the input is exhausted or starts with something unrecognized.
pub fn parse_one(input: &str) -> Option<(KeySpec, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }

    let open = input.find('(')?;
    let kind = KeyKind::from_name(&input[..open])?;
    let body_start = open + 1;
    let close = body_start + input[body_start..].find(')')?;
    let body = &input[body_start..close];

    let values = body
        .split(',')
        .map(|slot| Value::parse_slot(kind, slot))
        .collect::<Option<Vec<_>>>()?;

    let rest = &input[close + 1..];
    // tokens must be separated by whitespace
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some((KeySpec { kind, values }, rest))
}

/// Parses every leading token of `input`, stopping at the first unrecognized one.
pub fn parse_all(mut input: &str) -> Vec<KeySpec> {
    let mut keys = Vec::new();
    while let Some((key, rest)) = parse_one(input) {
        keys.push(key);
        input = rest;
    }
    keys
}

pub fn serialize_all(keys: &[KeySpec]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
