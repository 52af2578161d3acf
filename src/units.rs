use derive_more::{
    Add, AddAssign, Deref, DerefMut, Display, Div, From, Into, Mul, MulAssign, Sub, SubAssign,
    Sum,
};

/// A length in PDF points (1/72 of an inch). All layout geometry is expressed in points,
/// measured from the lower-left corner of the page.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    Div,
    MulAssign,
    Sum,
    Deref,
    DerefMut,
    From,
    Into,
    Display,
)]
pub struct Pt(pub f32);

impl Pt {
    pub const ZERO: Pt = Pt(0.0);

    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    /// Floors the value at `minimum`, used to keep declared sizes valid
    pub fn at_least(self, minimum: f32) -> Pt {
        Pt(self.0.max(minimum))
    }

    pub fn abs(self) -> Pt {
        Pt(self.0.abs())
    }
}

impl From<Pt> for f64 {
    fn from(p: Pt) -> Self {
        p.0 as f64
    }
}
