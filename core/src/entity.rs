//! Server-owned records cached on the client.

use std::fmt;

/// A record owned by the server and identified by a server-assigned id.
///
/// The client only ever holds cached copies, keyed by [`Entity::id`].
pub trait Entity: Clone {
    /// Identifier type (`_id` on the wire)
    type Id: Clone + PartialEq + fmt::Debug;

    /// The entity's identifier
    fn id(&self) -> &Self::Id;
}
