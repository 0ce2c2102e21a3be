use special::Beta;

/// Upper or lower tail probability of Student's t distribution with df degrees of freedom
pub fn pt(t: f64, df: f64, lower_tail: bool) -> anyhow::Result<f64> {
    if df.is_nan() || df <= 0.0 {
        Err(anyhow!("pt(): Invalid df {}", df))
    } else if t.is_nan() {
        Ok(f64::NAN)
    } else if t.is_infinite() {
        let flip = lower_tail ^ t.is_sign_negative();
        Ok(if flip { 1.0 } else { 0.0 })
    } else {
        let a = df * 0.5;
        let lbeta = a.ln_beta(0.5);
        let x = df / (df + t * t);
        let z = 0.5 * x.inc_beta(a, 0.5, lbeta);
        let flip = lower_tail ^ t.is_sign_negative();
        Ok(if flip { 1.0 - z } else { z })
    }
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / (v.len() as f64)
}

// Unbiased (n - 1) variance estimate
fn var(v: &[f64], m: f64) -> f64 {
    v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / ((v.len() - 1) as f64)
}

/// Result of a two sample t-test
#[derive(Debug, Clone, Copy)]
pub struct TTest {
    pub t: f64,
    pub df: f64,
    pub p: f64,
}

impl TTest {
    fn undefined() -> Self {
        Self {
            t: f64::NAN,
            df: f64::NAN,
            p: f64::NAN,
        }
    }
}

/// Two sided, two sample t-test without the assumption of equal variances
/// (Welch 1947), degrees of freedom from the Welch-Satterthwaite equation.
///
/// The statistic is positive when mean(x) > mean(y).
///
/// If either sample has fewer than 2 observations no variance estimate is
/// possible, and if both samples have zero variance the standard error is zero.
/// In both cases all fields of the result are NaN.
pub fn welch_t_test(x: &[f64], y: &[f64]) -> TTest {
    let (nx, ny) = (x.len(), y.len());
    if nx < 2 || ny < 2 {
        return TTest::undefined();
    }
    let (mx, my) = (mean(x), mean(y));
    let sx = var(x, mx) / (nx as f64);
    let sy = var(y, my) / (ny as f64);
    let se2 = sx + sy;
    if !(se2.is_finite() && se2 > 0.0) {
        return TTest::undefined();
    }
    let t = (mx - my) / se2.sqrt();
    let df = se2 * se2 / (sx * sx / ((nx - 1) as f64) + sy * sy / ((ny - 1) as f64));
    let p = pt(t.abs(), df, false)
        .map(|z| (2.0 * z).min(1.0))
        .unwrap_or(f64::NAN);
    TTest { t, df, p }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn t_distribution_tails() {
        // Symmetric about zero
        assert_approx_eq!(pt(0.0, 5.0, true).unwrap(), 0.5, 1e-12);
        let up = pt(2.0, 4.0, false).unwrap();
        let low = pt(-2.0, 4.0, true).unwrap();
        assert_approx_eq!(up, low, 1e-12);
        assert_approx_eq!(pt(2.0, 4.0, true).unwrap(), 1.0 - up, 1e-12);
        // df = 1 is the Cauchy distribution: P(T > 1) = 0.25
        assert_approx_eq!(pt(1.0, 1.0, false).unwrap(), 0.25, 1e-10);
        assert!(pt(1.0, 0.0, false).is_err());
        assert_eq!(pt(f64::INFINITY, 3.0, false).unwrap(), 0.0);
    }

    #[test]
    fn welch_reference_values() {
        let r = welch_t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_approx_eq!(r.t, -3.6742346141747673, 1e-10);
        assert_approx_eq!(r.df, 4.0, 1e-10);
        assert_approx_eq!(r.p, 0.021311641128756723, 1e-8);

        // Unequal group sizes and variances
        let r = welch_t_test(&[10.0, 12.0, 15.0], &[20.0, 19.0]);
        assert_approx_eq!(r.t, -4.664004843101107, 1e-10);
        assert_approx_eq!(r.df, 2.433479285954867, 1e-10);
        assert_approx_eq!(r.p, 0.029124249394655369, 1e-8);
    }

    #[test]
    fn welch_swapped_groups() {
        let a = welch_t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let b = welch_t_test(&[4.0, 5.0, 6.0], &[1.0, 2.0, 3.0]);
        assert_approx_eq!(a.t, -b.t, 1e-12);
        assert_approx_eq!(a.p, b.p, 1e-12);
    }

    #[test]
    fn welch_insufficient_replicates() {
        let r = welch_t_test(&[1.0, 2.0, 3.0], &[4.0]);
        assert!(r.p.is_nan());
        assert!(r.t.is_nan());
        let r = welch_t_test(&[], &[4.0, 5.0]);
        assert!(r.p.is_nan());
    }

    #[test]
    fn welch_zero_variance() {
        let r = welch_t_test(&[1.0, 1.0], &[2.0, 2.0]);
        assert!(r.p.is_nan());
        // Only one group constant is fine
        let r = welch_t_test(&[1.0, 1.0], &[2.0, 3.0]);
        assert!(r.p > 0.0 && r.p <= 1.0);
        assert_approx_eq!(r.df, 1.0, 1e-12);
    }

    #[test]
    fn mean_of_values() {
        assert_approx_eq!(mean(&[1.0, 2.0, 6.0]), 3.0, 1e-12);
        assert!(mean(&[]).is_nan());
    }
}
