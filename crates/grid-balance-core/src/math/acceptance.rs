// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Counts accepted proposals over a fixed-length observation window.
///
/// Adaptive annealing schedules read the acceptance rate once per full
/// window and reset the counter afterwards. The rate is always taken over
/// the configured window length, not over the observations seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcceptanceWindow {
    size: usize,
    seen: usize,
    accepted: usize,
}

impl AcceptanceWindow {
    /// Creates a window of `size` observations. A zero size is treated as one.
    #[inline]
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            seen: 0,
            accepted: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn seen(&self) -> usize {
        self.seen
    }

    #[inline]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    #[inline]
    pub fn record(&mut self, accepted: bool) {
        self.seen = self.seen.saturating_add(1);
        if accepted {
            self.accepted = self.accepted.saturating_add(1);
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.seen >= self.size
    }

    /// Acceptance rate over the full window length.
    #[inline]
    pub fn rate(&self) -> f64 {
        (self.accepted as f64) / (self.size as f64)
    }

    #[inline]
    pub fn reset(&mut self) {
        self.seen = 0;
        self.accepted = 0;
    }
}

impl std::fmt::Display for AcceptanceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AcceptanceWindow(accepted: {}/{}, size: {})",
            self.accepted, self.seen, self.size
        )
    }
}
