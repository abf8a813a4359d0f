use crate::OutlineError;
use smallvec::SmallVec;

const MAX_ARGUMENTS_STACK_LEN: usize = 48;

/// The operand stack of a charstring interpreter.
pub(crate) struct ArgumentsStack {
    data: SmallVec<[f32; 32]>,
}

impl ArgumentsStack {
    pub(crate) fn new() -> Self {
        Self {
            data: SmallVec::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub(crate) fn push(&mut self, n: f32) -> Result<(), OutlineError> {
        if self.data.len() == MAX_ARGUMENTS_STACK_LEN {
            return Err(OutlineError::ArgumentsStackLimitReached);
        }

        self.data.push(n);
        Ok(())
    }

    /// The operand at `index`, counted from the bottom of the stack.
    #[inline]
    pub(crate) fn at(&self, index: usize) -> Result<f32, OutlineError> {
        self.data
            .get(index)
            .copied()
            .ok_or(OutlineError::InvalidArgumentsStackLength)
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Result<f32, OutlineError> {
        self.data
            .pop()
            .ok_or(OutlineError::InvalidArgumentsStackLength)
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    /// Swap the two topmost operands.
    #[inline]
    pub(crate) fn exch(&mut self) -> Result<(), OutlineError> {
        let len = self.data.len();

        if len < 2 {
            return Err(OutlineError::InvalidArgumentsStackLength);
        }

        self.data.swap(len - 1, len - 2);
        Ok(())
    }
}

impl core::fmt::Debug for ArgumentsStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(&self.data).finish()
    }
}
