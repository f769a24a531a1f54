//! Interceptor Registry - Type-safe builder for constructing interceptor chains.

use crate::noop::NoopInterceptor;

/// Registry for constructing interceptor chains.
///
/// `Registry` uses a type-state pattern where each call to `.with()`
/// transforms the registry's type parameter, creating a new registry that wraps
/// the current chain with another interceptor.
///
/// # Example
///
/// ```ignore
/// use rtcore_interceptor::Registry;
///
/// // Build a chain of interceptors
/// let chain = Registry::new()
///     .with(SenderReportInterceptor::new)
///     .with(ReceiverReportInterceptor::new)
///     .with(|p| NackInterceptor::with_config(p, config))
///     .build();
///
/// // The resulting type is fully known at compile time:
/// // NackInterceptor<ReceiverReportInterceptor<SenderReportInterceptor<NoopInterceptor<...>>>>
/// ```
///
/// # Type Safety
///
/// The builder pattern ensures that interceptor chains are type-safe.
/// Each `.with()` call changes the return type, so the compiler can verify
/// that the chain is properly constructed.
pub struct Registry<P> {
    inner: P,
}

impl Registry<()> {
    /// Start building a new interceptor chain.
    ///
    /// This creates a registry with a `NoopInterceptor` as the innermost layer.
    /// The `NoopInterceptor` serves as a simple pass-through terminal.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let chain = Registry::new()
    ///     .with(MyInterceptor::new)
    ///     .build();
    /// ```
    pub fn new() -> Registry<NoopInterceptor> {
        Registry {
            inner: NoopInterceptor::new(),
        }
    }
}

impl<P> Registry<P> {
    /// Start building from an existing protocol.
    ///
    /// This allows using a custom innermost layer instead of `NoopInterceptor`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let custom_inner = MyCustomProtocol::new();
    /// let chain = Registry::from(custom_inner)
    ///     .with(MyInterceptor::new)
    ///     .build();
    /// ```
    pub fn from(inner: P) -> Self {
        Registry { inner }
    }

    /// Wrap the current chain with another interceptor.
    ///
    /// The wrapper function receives the current chain and returns a new
    /// interceptor that wraps it. This changes the registry's type parameter
    /// to reflect the new outer layer.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let chain = Registry::new()
    ///     .with(SenderReportInterceptor::new)  // Returns Registry<SenderReportInterceptor<...>>
    ///     .with(ReceiverReportInterceptor::new)  // Returns Registry<ReceiverReportInterceptor<...>>
    ///     .build();
    /// ```
    pub fn with<O, F>(self, f: F) -> Registry<O>
    where
        F: FnOnce(P) -> O,
    {
        Registry {
            inner: f(self.inner),
        }
    }

    /// Finish building and return the interceptor chain.
    ///
    /// This consumes the registry and returns the constructed chain.
    pub fn build(self) -> P {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use sansio::Protocol;

    // A minimal Protocol<i32, i32, ()> base case, standing in for
    // NoopInterceptor (which is hardwired to TaggedPacket) so these tests
    // can exercise Registry's generic wiring without pulling in the rest of
    // the interceptor stack.
    #[derive(Default)]
    struct I32Noop {
        read_queue: std::collections::VecDeque<i32>,
        write_queue: std::collections::VecDeque<i32>,
    }

    impl I32Noop {
        fn new() -> Self {
            Self::default()
        }
    }

    impl Protocol<i32, i32, ()> for I32Noop {
        type Rout = i32;
        type Wout = i32;
        type Eout = ();
        type Error = shared::error::Error;
        type Time = std::time::Instant;

        fn handle_read(&mut self, msg: i32) -> Result<(), Self::Error> {
            self.read_queue.push_back(msg);
            Ok(())
        }

        fn poll_read(&mut self) -> Option<Self::Rout> {
            self.read_queue.pop_front()
        }

        fn handle_write(&mut self, msg: i32) -> Result<(), Self::Error> {
            self.write_queue.push_back(msg);
            Ok(())
        }

        fn poll_write(&mut self) -> Option<Self::Wout> {
            self.write_queue.pop_front()
        }
    }

    use super::Registry;

    // A simple test interceptor that wraps an inner protocol
    struct TestInterceptor<P> {
        inner: P,
        name: &'static str,
    }

    impl<P> TestInterceptor<P> {
        fn new(inner: P) -> Self {
            Self {
                inner,
                name: "test",
            }
        }

        fn with_name(name: &'static str) -> impl FnOnce(P) -> Self {
            move |inner| Self { inner, name }
        }
    }

    impl<P: Protocol<i32, i32, ()>> Protocol<i32, i32, ()> for TestInterceptor<P> {
        type Rout = P::Rout;
        type Wout = P::Wout;
        type Eout = P::Eout;
        type Error = P::Error;
        type Time = P::Time;

        fn handle_read(&mut self, msg: i32) -> Result<(), Self::Error> {
            self.inner.handle_read(msg)
        }

        fn poll_read(&mut self) -> Option<Self::Rout> {
            self.inner.poll_read()
        }

        fn handle_write(&mut self, msg: i32) -> Result<(), Self::Error> {
            self.inner.handle_write(msg)
        }

        fn poll_write(&mut self) -> Option<Self::Wout> {
            self.inner.poll_write()
        }
    }

    #[test]
    fn test_registry_from() {
        let mut chain = Registry::from(I32Noop::new()).build();
        chain.handle_read(42).unwrap();
        assert_eq!(chain.poll_read(), Some(42));
    }

    #[test]
    fn test_registry_with_single_interceptor() {
        let mut chain = Registry::from(I32Noop::new())
            .with(TestInterceptor::new)
            .build();

        chain.handle_read(42).unwrap();
        assert_eq!(chain.poll_read(), Some(42));
        assert_eq!(chain.name, "test");
    }

    #[test]
    fn test_registry_with_multiple_interceptors() {
        let mut chain = Registry::from(I32Noop::new())
            .with(TestInterceptor::with_name("inner"))
            .with(TestInterceptor::with_name("outer"))
            .build();

        chain.handle_read(42).unwrap();
        assert_eq!(chain.poll_read(), Some(42));
        assert_eq!(chain.name, "outer");
        assert_eq!(chain.inner.name, "inner");
    }

    #[test]
    fn test_registry_from_custom_inner() {
        let custom = I32Noop::new();
        let mut chain = Registry::from(custom).with(TestInterceptor::new).build();

        chain.handle_write(100).unwrap();
        assert_eq!(chain.poll_write(), Some(100));
    }
}
