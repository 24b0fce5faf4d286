//! Extension points run at the end of `init` and `scan`.
//!
//! Both methods default to doing nothing and are always called. A board
//! hook and a user hook can be chained with a tuple: `(board, user)` runs
//! the board hook first.

/// Observer for the matrix lifecycle.
pub trait MatrixHooks {
    /// Called once after all pins are configured.
    fn after_init(&mut self) {}

    /// Called after every scan cycle with the cycle's change flag.
    fn after_scan(&mut self, _changed: bool) {}
}

/// The default: no extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl MatrixHooks for NoHooks {}

impl<H: MatrixHooks + ?Sized> MatrixHooks for &mut H {
    fn after_init(&mut self) {
        H::after_init(self)
    }

    fn after_scan(&mut self, changed: bool) {
        H::after_scan(self, changed)
    }
}

impl<A: MatrixHooks, B: MatrixHooks> MatrixHooks for (A, B) {
    fn after_init(&mut self) {
        self.0.after_init();
        self.1.after_init();
    }

    fn after_scan(&mut self, changed: bool) {
        self.0.after_scan(changed);
        self.1.after_scan(changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace {
        calls: Vec<&'static str>,
    }

    struct Tag<'a>(&'static str, &'a core::cell::RefCell<Trace>);

    impl MatrixHooks for Tag<'_> {
        fn after_init(&mut self) {
            self.1.borrow_mut().calls.push(self.0);
        }

        fn after_scan(&mut self, changed: bool) {
            let name = if changed { "changed" } else { "idle" };
            let mut trace = self.1.borrow_mut();
            trace.calls.push(self.0);
            trace.calls.push(name);
        }
    }

    #[test]
    fn chained_hooks_run_board_then_user() {
        let trace = core::cell::RefCell::new(Trace::default());
        let mut hooks = (Tag("board", &trace), Tag("user", &trace));

        hooks.after_init();
        hooks.after_scan(true);

        assert_eq!(
            trace.borrow().calls,
            ["board", "user", "board", "changed", "user", "changed"]
        );
    }

    #[test]
    fn no_hooks_is_a_no_op() {
        let mut hooks = NoHooks;
        hooks.after_init();
        hooks.after_scan(false);
    }
}
