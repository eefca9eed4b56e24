/// Floor-mod of `x` into `[0, n)`. Negative offsets wrap to the top.
#[inline]
pub fn wrap(x: i64, n: usize) -> usize {
	debug_assert!(n > 0);
	x.rem_euclid(n as i64) as usize
}

/// Floor-mod of `x` into `[0, n)` for fractional positions. Returns 0 when `n` is not positive.
#[inline]
pub fn fwrap(x: f64, n: f64) -> f64 {
	if n <= 0.0 || !x.is_finite() {
		return 0.0;
	}

	// rem_euclid may round up to exactly `n` for tiny negative inputs
	let wrapped = x.rem_euclid(n);
	if wrapped >= n { 0.0 } else { wrapped }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
	a + t * (b - a)
}

#[inline]
pub fn smoothstep(t: f32) -> f32 {
	t * t * (3.0 - 2.0 * t)
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wrap_is_textbook_floor_mod() {
		assert_eq!(wrap(0, 10), 0);
		assert_eq!(wrap(9, 10), 9);
		assert_eq!(wrap(10, 10), 0);
		assert_eq!(wrap(-1, 10), 9);
		assert_eq!(wrap(-10, 10), 0);
		assert_eq!(wrap(-11, 10), 9);
		assert_eq!(wrap(-3, 1), 0);
	}

	#[test]
	fn fwrap_stays_in_range() {
		assert_eq!(fwrap(-0.5, 10.0), 9.5);
		assert_eq!(fwrap(12.25, 10.0), 2.25);
		assert_eq!(fwrap(5.0, 0.0), 0.0);
		assert_eq!(fwrap(f64::NAN, 10.0), 0.0);

		let tiny = fwrap(-1e-20, 10.0);
		assert!((0.0..10.0).contains(&tiny));
	}

	#[test]
	fn smoothstep_endpoints() {
		assert_eq!(smoothstep(0.0), 0.0);
		assert_eq!(smoothstep(1.0), 1.0);
		assert_eq!(smoothstep(0.5), 0.5);
	}
}
