use crate::{ErrString, PlaitError, PlaitResult};

mod private {
    use crate::PlaitResult;

    pub trait SealedResult {}

    impl<T> SealedResult for PlaitResult<T> {}
}

/// Attach a lazily built message to the error side of a [`PlaitResult`].
pub trait ContextExt<T>: private::SealedResult {
    /// Wrap the error, if any, in [`PlaitError::Context`].
    fn with_context<M, F>(self, msg: F) -> PlaitResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M;
}

impl<T> ContextExt<T> for PlaitResult<T> {
    fn with_context<M, F>(self, msg: F) -> PlaitResult<T>
    where
        M: Into<ErrString>,
        F: FnOnce() -> M,
    {
        self.map_err(|err: PlaitError| err.with_context(msg()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plait_err;

    #[test]
    fn context_wraps_error() {
        let res: PlaitResult<()> = Err(plait_err!(ColumnDesync: "reader {} ran dry", 2));
        let err = res.with_context(|| "while assembling record 7").unwrap_err();
        assert!(matches!(err, PlaitError::Context(..)));
        assert!(err.to_string().starts_with("while assembling record 7"));
        assert!(matches!(err.root(), PlaitError::ColumnDesync(..)));
    }
}
