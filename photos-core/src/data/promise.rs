use crate::error::Error;

#[derive(Clone, Debug)]
pub enum Promise<T, D = (), E = Error> {
    Empty,
    Deferred(D),
    Resolved(T),
    Rejected(E),
}

impl<T, D, E> Promise<T, D, E> {
    pub fn is_deferred(&self, def: &D) -> bool
    where
        D: PartialEq,
    {
        matches!(self, Self::Deferred(d) if d == def)
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(val) => Some(val),
            _ => None,
        }
    }

    pub fn defer(&mut self, def: D) {
        *self = Self::Deferred(def);
    }

    pub fn resolve_or_reject(&mut self, res: Result<T, E>) {
        *self = match res {
            Ok(ok) => Self::Resolved(ok),
            Err(err) => Self::Rejected(err),
        };
    }

    /// Settles the promise, but only if it is still waiting on `def`.
    /// Returns whether the result was taken.
    pub fn update(&mut self, (def, res): (D, Result<T, E>)) -> bool
    where
        D: PartialEq,
    {
        if self.is_deferred(&def) {
            self.resolve_or_reject(res);
            true
        } else {
            false
        }
    }
}

impl<T, D, E> Default for Promise<T, D, E> {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_ignores_superseded_deferrals() {
        let mut promise: Promise<&str, u32> = Promise::Empty;
        promise.defer(1);
        promise.defer(2);

        assert!(!promise.update((1, Ok("first"))));
        assert!(promise.is_deferred(&2));

        assert!(promise.update((2, Ok("second"))));
        assert_eq!(promise.resolved(), Some(&"second"));
    }

    #[test]
    fn rejection_clears_the_value() {
        let mut promise: Promise<(), u32> = Promise::default();
        promise.defer(7);
        assert!(promise.update((7, Err(Error::HttpError { status: 404 }))));
        assert!(matches!(promise, Promise::Rejected(ref err) if err.is_not_found()));
        assert!(promise.resolved().is_none());
    }
}
