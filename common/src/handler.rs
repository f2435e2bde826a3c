//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of some operation.
///
/// The same type may handle multiple operations, with the `Args` type
/// identifying the operation being executed.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
