use crate::float::MAX_FRACTION_DIGITS;

pub(crate) struct FloatTables {
    /// `10^d` for every supported digit count.
    pub(crate) pow10: [f64; MAX_FRACTION_DIGITS + 1],
    /// `0.5 * 10^-d`: added before truncation to round half up.
    pub(crate) rounding: [f64; MAX_FRACTION_DIGITS + 1],
}

lazy_static! {
    pub(crate) static ref FLOAT_TABLES: FloatTables = {
        let mut pow10 = [1.0; MAX_FRACTION_DIGITS + 1];
        let mut rounding = [0.5; MAX_FRACTION_DIGITS + 1];
        for d in 1..=MAX_FRACTION_DIGITS {
            pow10[d] = pow10[d - 1] * 10.0;
            rounding[d] = 0.5 / pow10[d];
        }
        FloatTables { pow10, rounding }
    };
}
