//! Helpers shared by unit tests inside the library.

pub(crate) mod socket_guard;
