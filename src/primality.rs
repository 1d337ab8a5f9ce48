/// Trial-division primality test with the 6k ± 1 skip
///
/// Techniques used:
/// - Early exit for small numbers: n <= 1 is not prime, 2 and 3 are,
///   and multiples of 2 or 3 are rejected before the loop
/// - 6k ± 1 optimization: every prime > 3 has the form 6k - 1 or 6k + 1,
///   so only those candidates are tried as divisors
/// - Square root boundary: a composite n always has a divisor <= sqrt(n),
///   so the loop stops once candidate * candidate > n
///
/// Pure function: no allocation, no shared state, safe to call from any
/// number of threads concurrently.
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // Candidates 5, 7, 11, 13, ... i.e. 6k - 1 and 6k + 1 for k >= 1.
    // The bound is written i <= n / i (same as i * i <= n for positive
    // integers) so the square cannot overflow i64 when n is near i64::MAX
    let mut i: i64 = 5;
    while i <= n / i {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_and_one_are_not_prime() {
        assert!(!is_prime(-17));
        assert!(!is_prime(-2));
        assert!(!is_prime(-1));
        assert!(!is_prime(0));
        assert!(!is_prime(1));
    }

    #[test]
    fn test_two_and_three_are_prime() {
        assert!(is_prime(2));
        assert!(is_prime(3));
    }

    #[test]
    fn test_small_composites() {
        for n in [4, 6, 8, 9, 10, 12, 15, 21, 25, 27, 33, 49] {
            assert!(!is_prime(n), "{} should not be prime", n);
        }
    }

    #[test]
    fn test_small_primes() {
        for n in [5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47] {
            assert!(is_prime(n), "{} should be prime", n);
        }
    }

    #[test]
    fn test_squares_of_primes_are_composite() {
        // Exercises the candidate * candidate <= n boundary exactly
        for p in [2_i64, 3, 5, 7, 11, 13, 101] {
            assert!(!is_prime(p * p), "{} should not be prime", p * p);
        }
    }

    #[test]
    fn test_larger_known_values() {
        assert!(is_prime(7919)); // 1000th prime
        assert!(is_prime(104_729)); // 10000th prime
        assert!(is_prime(2_147_483_647)); // 2^31 - 1, Mersenne prime
        assert!(!is_prime(7917));
        assert!(!is_prime(104_730));
        assert!(!is_prime(1_000_000_007_i64 * 3));
    }

    #[test]
    fn test_values_near_i64_max_do_not_overflow() {
        // i64::MAX = 7^2 * 73 * 127 * 337 * 92737 * 649657
        assert!(!is_prime(i64::MAX));
        assert!(!is_prime(i64::MAX - 1)); // even
        // Largest prime below 2^63; its divisor loop runs all the way to
        // the square-root bound, where the squared form would overflow
        assert!(is_prime(9_223_372_036_854_775_783));
    }

    #[test]
    fn test_matches_naive_sieve_up_to_1000() {
        let limit = 1000_usize;
        let mut sieve = vec![true; limit + 1];
        sieve[0] = false;
        sieve[1] = false;
        for i in 2..=limit {
            if sieve[i] {
                let mut j = i * i;
                while j <= limit {
                    sieve[j] = false;
                    j += i;
                }
            }
        }

        for n in 0..=limit {
            assert_eq!(
                is_prime(n as i64),
                sieve[n],
                "disagreement with sieve at {}",
                n
            );
        }
    }
}
