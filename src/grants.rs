use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// A capability granted to the holder of a room access token.
///
/// Grants are identified by kind, and by room for room-scoped permission
/// grants. Adding a grant to a [`VideoGrantSet`] replaces any prior grant
/// with the same identity.
#[derive(Clone, Debug, PartialEq)]
pub enum VideoGrant {
    /// Whether the holder may create rooms.
    RoomCreate(bool),

    /// Whether the holder may join a room.
    RoomJoin(bool),

    /// Whether the holder may list rooms.
    RoomList(bool),

    /// Whether the holder may start recordings.
    RoomRecord(bool),

    /// Whether the holder may perform admin actions on a room.
    RoomAdmin(bool),

    /// Fine grained permissions within a single room.
    RoomPermission {
        /// The room these permissions apply to.
        room: String,

        /// Whether the holder may publish media tracks.
        can_publish: bool,

        /// Whether the holder may subscribe to other participants' tracks.
        can_subscribe: bool,

        /// Whether the holder may publish data messages.
        can_publish_data: bool,

        /// Whether the holder is hidden from other participants.
        hidden: bool,

        /// Whether the holder joins as a recorder.
        recorder: bool,
    },
}

impl VideoGrant {
    /// Construct a [`VideoGrant::RoomPermission`] for the given room with every
    /// permission flag off.
    pub fn room_permission<S: Into<String>>(room: S) -> Self {
        Self::RoomPermission {
            room: room.into(),
            can_publish: false,
            can_subscribe: false,
            can_publish_data: false,
            hidden: false,
            recorder: false,
        }
    }

    /// The identity of this grant within a grant set.
    pub fn key(&self) -> GrantKey {
        match self {
            Self::RoomCreate(_) => GrantKey::RoomCreate,
            Self::RoomJoin(_) => GrantKey::RoomJoin,
            Self::RoomList(_) => GrantKey::RoomList,
            Self::RoomRecord(_) => GrantKey::RoomRecord,
            Self::RoomAdmin(_) => GrantKey::RoomAdmin,
            Self::RoomPermission { room, .. } => GrantKey::RoomPermission(room.clone()),
        }
    }

    /// Serialize this grant into its wire `(key, value)` pair.
    ///
    /// This is a pure function: the same grant always produces the same pair.
    pub fn to_key_value(&self) -> (String, Value) {
        let key = self.key().wire_key();
        let value = match self {
            Self::RoomCreate(allowed)
            | Self::RoomJoin(allowed)
            | Self::RoomList(allowed)
            | Self::RoomRecord(allowed)
            | Self::RoomAdmin(allowed) => Value::Bool(*allowed),
            Self::RoomPermission { can_publish, can_subscribe, can_publish_data, hidden, recorder, .. } => {
                json!({
                    "canPublish": can_publish,
                    "canSubscribe": can_subscribe,
                    "canPublishData": can_publish_data,
                    "hidden": hidden,
                    "recorder": recorder,
                })
            }
        };
        (key, value)
    }
}

/// The identity of a grant: its kind, plus the room for room-scoped grants.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrantKey {
    RoomCreate,
    RoomJoin,
    RoomList,
    RoomRecord,
    RoomAdmin,
    RoomPermission(String),
}

impl GrantKey {
    /// The key under which a grant with this identity appears in the `video` claim.
    ///
    /// Global grants use the literal kind name. Room scoped permission grants
    /// embed the room name so that permissions for different rooms never collide.
    pub fn wire_key(&self) -> String {
        match self {
            Self::RoomCreate => "roomCreate".into(),
            Self::RoomJoin => "roomJoin".into(),
            Self::RoomList => "roomList".into(),
            Self::RoomRecord => "roomRecord".into(),
            Self::RoomAdmin => "roomAdmin".into(),
            Self::RoomPermission(room) => format!("room:{room}"),
        }
    }
}

/// A set of grants keyed by grant identity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoGrantSet {
    grants: BTreeMap<GrantKey, VideoGrant>,
}

impl VideoGrantSet {
    /// Construct an empty grant set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grant, replacing any existing grant with the same identity.
    pub fn add(&mut self, grant: VideoGrant) {
        self.grants.insert(grant.key(), grant);
    }

    /// Add every grant in the given sequence, in order.
    pub fn add_all<I>(&mut self, grants: I)
    where
        I: IntoIterator<Item = VideoGrant>,
    {
        for grant in grants {
            self.add(grant);
        }
    }

    /// Remove all grants.
    pub fn clear(&mut self) {
        self.grants.clear();
    }

    /// The number of grants in this set.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether this set contains no grants.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterate over the grants in this set, ordered by grant identity.
    pub fn iter(&self) -> impl Iterator<Item = &VideoGrant> {
        self.grants.values()
    }

    /// Whether this set contains a room join grant with value `true`.
    pub(crate) fn allows_room_join(&self) -> bool {
        matches!(self.grants.get(&GrantKey::RoomJoin), Some(VideoGrant::RoomJoin(true)))
    }

    /// Serialize this set into the `video` claim object.
    ///
    /// Keys are ordered by grant identity so the output is deterministic.
    pub fn to_claim(&self) -> JsonObject {
        self.grants.values().map(VideoGrant::to_key_value).collect()
    }
}
