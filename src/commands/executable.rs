use crate::response::Response;
use crate::store::Store;

/// The seam between parsing and the store: a parsed command runs against
/// the store and produces its wire response. No store operation in this
/// protocol can fail, so execution is infallible; a GET on a missing key
/// answers `Nil` rather than erroring.
pub trait Executable {
    fn exec(self, store: &Store) -> Response;
}
