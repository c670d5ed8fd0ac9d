//! Easing functions for particle progress.
//!
//! Every function maps a progress value `t` in 0..=1 to an eased value.
//! Configuration stores easing functions by name; the name is resolved once to
//! an integer ID (its position in [`Easing::ALL`]) and per-instance evaluation
//! dispatches on that ID through [`evaluate`].
//!
//! Piecewise functions split on `t < 0.5`, so `t == 0.5` always takes the
//! second branch.

use std::f32::consts::PI;

/// Overshoot constant for the Back family.
const BACK_S: f32 = 1.70158;

/// Easing function selector, ordered by dispatch ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Easing {
    #[default]
    Linear = 0,
    InPower1 = 1,
    OutPower1 = 2,
    InOutPower1 = 3,
    InPower2 = 4,
    OutPower2 = 5,
    InOutPower2 = 6,
    InPower3 = 7,
    OutPower3 = 8,
    InOutPower3 = 9,
    InPower4 = 10,
    OutPower4 = 11,
    InOutPower4 = 12,
    InQuad = 13,
    OutQuad = 14,
    InOutQuad = 15,
    InCubic = 16,
    OutCubic = 17,
    InOutCubic = 18,
    InQuart = 19,
    OutQuart = 20,
    InOutQuart = 21,
    InQuint = 22,
    OutQuint = 23,
    InOutQuint = 24,
    InSine = 25,
    OutSine = 26,
    InOutSine = 27,
    InExpo = 28,
    OutExpo = 29,
    InOutExpo = 30,
    InCirc = 31,
    OutCirc = 32,
    InOutCirc = 33,
    InElastic = 34,
    OutElastic = 35,
    InOutElastic = 36,
    InBack = 37,
    OutBack = 38,
    InOutBack = 39,
}

impl Easing {
    /// Number of dispatchable easing functions.
    pub const COUNT: usize = 40;

    /// All easing functions in dispatch order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Linear,
        Self::InPower1,
        Self::OutPower1,
        Self::InOutPower1,
        Self::InPower2,
        Self::OutPower2,
        Self::InOutPower2,
        Self::InPower3,
        Self::OutPower3,
        Self::InOutPower3,
        Self::InPower4,
        Self::OutPower4,
        Self::InOutPower4,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InQuint,
        Self::OutQuint,
        Self::InOutQuint,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
        Self::InCirc,
        Self::OutCirc,
        Self::InOutCirc,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
        Self::InBack,
        Self::OutBack,
        Self::InOutBack,
    ];

    /// Configuration names, indexed by dispatch ID.
    pub const NAMES: [&'static str; Self::COUNT] = [
        "easeLinear",
        "easeInPower1",
        "easeOutPower1",
        "easeInOutPower1",
        "easeInPower2",
        "easeOutPower2",
        "easeInOutPower2",
        "easeInPower3",
        "easeOutPower3",
        "easeInOutPower3",
        "easeInPower4",
        "easeOutPower4",
        "easeInOutPower4",
        "easeInQuad",
        "easeOutQuad",
        "easeInOutQuad",
        "easeInCubic",
        "easeOutCubic",
        "easeInOutCubic",
        "easeInQuart",
        "easeOutQuart",
        "easeInOutQuart",
        "easeInQuint",
        "easeOutQuint",
        "easeInOutQuint",
        "easeInSine",
        "easeOutSine",
        "easeInOutSine",
        "easeInExpo",
        "easeOutExpo",
        "easeInOutExpo",
        "easeInCirc",
        "easeOutCirc",
        "easeInOutCirc",
        "easeInElastic",
        "easeOutElastic",
        "easeInOutElastic",
        "easeInBack",
        "easeOutBack",
        "easeInOutBack",
    ];

    /// Resolves a configuration name to its easing function.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|index| Self::ALL[index])
    }

    /// Converts from a dispatch ID.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Returns the dispatch ID.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Returns the configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Applies this easing function.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        evaluate(self.id(), t)
    }
}

/// Applies the easing function with the given dispatch ID.
///
/// IDs outside the table fall through to identity.
#[must_use]
pub fn evaluate(id: u32, t: f32) -> f32 {
    match id {
        1 => in_power(t, 1),
        2 => out_power(t, 1),
        3 => in_out_power(t, 1),
        4 => in_power(t, 2),
        5 => out_power(t, 2),
        6 => in_out_power(t, 2),
        7 => in_power(t, 3),
        8 => out_power(t, 3),
        9 => in_out_power(t, 3),
        10 => in_power(t, 4),
        11 => out_power(t, 4),
        12 => in_out_power(t, 4),
        13 => in_quad(t),
        14 => out_quad(t),
        15 => in_out_quad(t),
        16 => in_cubic(t),
        17 => out_cubic(t),
        18 => in_out_cubic(t),
        19 => in_quart(t),
        20 => out_quart(t),
        21 => in_out_quart(t),
        22 => in_quint(t),
        23 => out_quint(t),
        24 => in_out_quint(t),
        25 => in_sine(t),
        26 => out_sine(t),
        27 => in_out_sine(t),
        28 => in_expo(t),
        29 => out_expo(t),
        30 => in_out_expo(t),
        31 => in_circ(t),
        32 => out_circ(t),
        33 => in_out_circ(t),
        34 => in_elastic(t),
        35 => out_elastic(t),
        36 => in_out_elastic(t),
        37 => in_back(t),
        38 => out_back(t),
        39 => in_out_back(t),
        _ => t,
    }
}

// Power family

/// `tᴺ`.
#[inline]
#[must_use]
pub fn in_power(t: f32, n: i32) -> f32 {
    t.powi(n)
}

/// `1 - (1-t)ᴺ`.
#[inline]
#[must_use]
pub fn out_power(t: f32, n: i32) -> f32 {
    1.0 - (1.0 - t).powi(n)
}

/// `2ᴺ⁻¹·tᴺ` below one half, `1 - (-2t+2)ᴺ/2` from one half on.
#[inline]
#[must_use]
pub fn in_out_power(t: f32, n: i32) -> f32 {
    if n == 1 {
        return t;
    }
    if t < 0.5 {
        2f32.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

// Quad..Quint, two-piece textbook forms

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_quad(t: f32) -> f32 {
    t * t
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_cubic(t: f32) -> f32 {
    t * t * t
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_cubic(t: f32) -> f32 {
    let t1 = t - 1.0;
    1.0 + t1 * t1 * t1
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_quart(t: f32) -> f32 {
    t * t * t * t
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_quart(t: f32) -> f32 {
    let t1 = t - 1.0;
    1.0 - t1 * t1 * t1 * t1
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_quart(t: f32) -> f32 {
    let t1 = t - 1.0;
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        1.0 - 8.0 * t1 * t1 * t1 * t1
    }
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_quint(t: f32) -> f32 {
    t * t * t * t * t
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_quint(t: f32) -> f32 {
    let t1 = t - 1.0;
    1.0 + t1 * t1 * t1 * t1 * t1
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_quint(t: f32) -> f32 {
    let t1 = t - 1.0;
    if t < 0.5 {
        16.0 * t * t * t * t * t
    } else {
        1.0 + 16.0 * t1 * t1 * t1 * t1 * t1
    }
}

// Sine

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_sine(t: f32) -> f32 {
    1.0 - (t * PI * 0.5).cos()
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_sine(t: f32) -> f32 {
    (t * PI * 0.5).sin()
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_sine(t: f32) -> f32 {
    -0.5 * ((PI * t).cos() - 1.0)
}

// Expo

/// Exponential ease in; exactly 0 at `t == 0`.
#[inline]
#[must_use]
pub fn in_expo(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        2f32.powf(10.0 * (t - 1.0))
    }
}

/// Exponential ease out; exactly 1 at `t == 1`.
#[inline]
#[must_use]
pub fn out_expo(t: f32) -> f32 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2f32.powf(-10.0 * t)
    }
}

/// Exponential ease in-out; exact at both ends.
#[inline]
#[must_use]
pub fn in_out_expo(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    if t < 0.5 {
        0.5 * 2f32.powf(20.0 * t - 10.0)
    } else {
        0.5 * (2.0 - 2f32.powf(-20.0 * t + 10.0))
    }
}

// Circ

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_circ(t: f32) -> f32 {
    -((1.0 - t * t).sqrt() - 1.0)
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_circ(t: f32) -> f32 {
    let t1 = t - 1.0;
    (1.0 - t1 * t1).sqrt()
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_circ(t: f32) -> f32 {
    if t < 0.5 {
        let t1 = 2.0 * t;
        -0.5 * ((1.0 - t1 * t1).sqrt() - 1.0)
    } else {
        let t2 = 2.0 * t - 2.0;
        0.5 * ((1.0 - t2 * t2).sqrt() + 1.0)
    }
}

// Elastic

/// Damped sine ease in, period 0.3; exact at both ends.
#[inline]
#[must_use]
pub fn in_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    -(2f32.powf(10.0 * (t - 1.0))) * ((t - 1.075) * (2.0 * PI) / 0.3).sin()
}

/// Damped sine ease out, period 0.3; exact at both ends.
#[inline]
#[must_use]
pub fn out_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    2f32.powf(-10.0 * t) * ((t - 0.075) * (2.0 * PI) / 0.3).sin() + 1.0
}

/// Damped sine ease in-out, period 4.5 over the `20t` domain; exact at both ends.
#[inline]
#[must_use]
pub fn in_out_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let wave = ((20.0 * t - 11.125) * (2.0 * PI) / 4.5).sin();
    if t < 0.5 {
        -0.5 * 2f32.powf(20.0 * t - 10.0) * wave
    } else {
        2f32.powf(-20.0 * t + 10.0) * wave * 0.5 + 1.0
    }
}

// Back

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_back(t: f32) -> f32 {
    t * t * ((BACK_S + 1.0) * t - BACK_S)
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn out_back(t: f32) -> f32 {
    let t1 = t - 1.0;
    t1 * t1 * ((BACK_S + 1.0) * t1 + BACK_S) + 1.0
}

#[inline]
#[must_use]
#[allow(missing_docs)]
pub fn in_out_back(t: f32) -> f32 {
    let s = BACK_S * 1.525;
    let t2 = t * 2.0;
    if t2 < 1.0 {
        0.5 * (t2 * t2 * ((s + 1.0) * t2 - s))
    } else {
        let t2 = t2 - 2.0;
        0.5 * (t2 * t2 * ((s + 1.0) * t2 + s) + 2.0)
    }
}

// Bounce (library only, no dispatch ID)

/// Four-segment piecewise quadratic bounce.
#[must_use]
pub fn out_bounce(t: f32) -> f32 {
    const K: f32 = 7.5625;
    if t < 1.0 / 2.75 {
        K * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        K * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        K * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        K * t * t + 0.984375
    }
}

/// `1 - out_bounce(1 - t)`.
#[must_use]
pub fn in_bounce(t: f32) -> f32 {
    1.0 - out_bounce(1.0 - t)
}

/// Bounce mirrored around one half.
#[must_use]
pub fn in_out_bounce(t: f32) -> f32 {
    if t < 0.5 {
        (1.0 - out_bounce(1.0 - 2.0 * t)) * 0.5
    } else {
        (1.0 + out_bounce(2.0 * t - 1.0)) * 0.5
    }
}
