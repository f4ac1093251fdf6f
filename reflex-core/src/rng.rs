/// Randomness handed to the agent by its caller. The agent draws from it
/// as-is and never reseeds it.
pub trait RandomSource {
    /// Uniform integer in `0..bound`. `bound` is always > 0.
    fn next_int(&mut self, bound: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    fn next_range(&mut self, min: u32, max_exclusive: u32) -> u32 {
        debug_assert!(max_exclusive > min);
        min + self.next_int(max_exclusive - min)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_int(&mut self, bound: u32) -> u32 {
        (**self).next_int(bound)
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }
}

impl RandomSource for SeededRng {
    fn next_int(&mut self, bound: u32) -> u32 {
        self.next() % bound
    }

    fn next_f64(&mut self) -> f64 {
        self.next() as f64 / 4_294_967_296.0
    }
}
