//! Pure request handlers invoked by the router.

/// Largest `n` whose Fibonacci number still fits in a u64.
pub const MAX_FIBONACCI_INPUT: u64 = 93;

/// Iterative Fibonacci. Returns `None` once the value no longer fits in a
/// u64, which happens for every `n > MAX_FIBONACCI_INPUT`.
pub fn fibonacci(n: u64) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }

    let (mut previous, mut current) = (0u64, 1u64);
    for _ in 2..=n {
        let next = previous.checked_add(current)?;
        previous = current;
        current = next;
    }

    Some(current)
}
