// Credential handling for the REST surface. Hashing lives here so the user
// repository only ever sees opaque credential material.
mod hasher;
mod session;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use session::SessionStore;
