use core::fmt;
use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    #[serde(rename = "P1")]
    A,
    #[serde(rename = "P2")]
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub const fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Side::A => "P1",
            Side::B => "P2",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P1" | "A" => Ok(Side::A),
            "P2" | "B" => Ok(Side::B),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

/// One value per side. Serializes as `{"P1": .., "P2": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SidePair<T> {
    #[serde(rename = "P1")]
    a: T,
    #[serde(rename = "P2")]
    b: T,
}

impl<T> SidePair<T> {
    pub const fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            a: value.clone(),
            b: value,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Side, &T) -> U) -> SidePair<U> {
        SidePair {
            a: f(Side::A, &self.a),
            b: f(Side::B, &self.b),
        }
    }
}

impl SidePair<u32> {
    pub const ZERO: SidePair<u32> = SidePair::new(0, 0);

    pub fn total(&self) -> u32 {
        self.a + self.b
    }
}

impl<T> Index<Side> for SidePair<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

impl<T> IndexMut<Side> for SidePair<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}
