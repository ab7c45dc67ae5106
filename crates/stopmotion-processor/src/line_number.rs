//! Sequential line number allocation

use stopmotion_core::GcodeError;

/// Prefix of every line number word
pub const LINE_PREFIX: char = 'N';

/// Hands out strictly increasing line numbers with a fixed stride
///
/// Once the next number would pass `u64::MAX` the generator is exhausted and
/// every further allocation fails; numbers never wrap.
#[derive(Debug, Clone)]
pub struct LineNumberGenerator {
    next: Option<u64>,
    step: u64,
}

impl LineNumberGenerator {
    /// Create a generator starting at `initial` and advancing by `step`
    pub fn new(initial: u64, step: u64) -> Self {
        debug_assert!(step > 0, "line number stride must be positive");
        Self {
            next: Some(initial),
            step,
        }
    }

    /// Get the next line number
    pub fn allocate(&mut self) -> Result<u64, GcodeError> {
        let line = self
            .next
            .ok_or(GcodeError::LineNumberOverflow { needed: 1 })?;
        self.next = line.checked_add(self.step);
        Ok(line)
    }

    /// Get the next line number formatted as an `N` word (`N0001`)
    pub fn allocate_word(&mut self) -> Result<String, GcodeError> {
        self.allocate().map(format_line_number)
    }

    /// Check that `count` more allocations will succeed, without allocating
    pub fn ensure_available(&self, count: u64) -> Result<(), GcodeError> {
        if count == 0 {
            return Ok(());
        }
        let last = self.next.and_then(|next| {
            self.step
                .checked_mul(count - 1)
                .and_then(|span| next.checked_add(span))
        });
        match last {
            Some(_) => Ok(()),
            None => Err(GcodeError::LineNumberOverflow { needed: count }),
        }
    }

    /// Number the next allocation will return, `None` once exhausted
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    /// Stride between allocations
    pub fn step(&self) -> u64 {
        self.step
    }
}

/// Render a line number as `N` followed by at least four digits
pub fn format_line_number(line: u64) -> String {
    format!("{}{:04}", LINE_PREFIX, line)
}
