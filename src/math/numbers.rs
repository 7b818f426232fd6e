// The constants the generic vector math needs on top of num_traits' float.
// Photons are only ever traced in f64.

pub trait Float: num_traits::Float {
    const PI: Self;
    const PI_OVER_2: Self;
    const PI_OVER_4: Self;

    fn two() -> Self;
}

impl Float for f64 {
    const PI: Self = std::f64::consts::PI;
    const PI_OVER_2: Self = std::f64::consts::FRAC_PI_2;
    const PI_OVER_4: Self = std::f64::consts::FRAC_PI_4;

    fn two() -> Self {
        2.
    }
}
