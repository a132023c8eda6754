/// Step ceilings for the passes that can loop on malformed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub parser_steps: usize,
    pub semantic_steps: usize,
    pub interpreter_steps: usize,
}

impl Limits {
    pub const DEFAULT_STEPS: usize = 10_000;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            parser_steps: Self::DEFAULT_STEPS,
            semantic_steps: Self::DEFAULT_STEPS,
            interpreter_steps: Self::DEFAULT_STEPS,
        }
    }
}
