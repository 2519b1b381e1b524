//! Message envelopes and the typed payloads they carry.
//!
//! Two envelopes travel on the wire: a [`Request`] from client to server
//! and a [`Response`] back. Both render to a JSON object whose field names
//! are part of the protocol (`Username`, `DataType`, `Data`, `Status`,
//! `Message`).
//!
//! A request's `Data` is itself the JSON rendering of one typed payload.
//! Which one is named by the `DataType` tag:
//!
//! ```text
//! DataType       Data holds
//! ─────────────  ─────────────────────────────
//! IDENTITY       IdentityRequest { Username }
//! DIGEST         DigestRequest   { Dir }
//! SYNC-REQUEST   SyncRequest     { Action, File }
//! FILE           FileRequest     { File, Content }
//! ```
//!
//! The envelope does not check that the tag and the bytes agree. Build
//! requests with [`Request::with_payload`] and read them with
//! [`Request::payload`] to keep the two in step.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MESSAGE_ACCEPT, MESSAGE_DENY, STATUS_BAD, STATUS_OK, TYPE_DIGEST, TYPE_FILE, TYPE_IDENTITY,
    TYPE_SYNC_REQUEST,
};
use crate::error::{ProtocolError, Result};

// ---------------------------------------------------------------------------
// Binary-safe byte fields
// ---------------------------------------------------------------------------

/// Serde adapter that renders `Vec<u8>` as a standard, padded base64
/// string.
///
/// This is the representation peers already expect for raw bytes inside
/// JSON, and it keeps the delimiter byte out of the encoded text. `null`
/// is accepted on input and read as an empty buffer.
pub(crate) mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => STANDARD.decode(text).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// The closed set of payload kinds a [`Request`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Identity,
    Digest,
    SyncRequest,
    File,
}

impl DataType {
    /// The tag string written into `Request.DataType`.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Identity => TYPE_IDENTITY,
            DataType::Digest => TYPE_DIGEST,
            DataType::SyncRequest => TYPE_SYNC_REQUEST,
            DataType::File => TYPE_FILE,
        }
    }
}

impl FromStr for DataType {
    type Err = ProtocolError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            TYPE_IDENTITY => Ok(DataType::Identity),
            TYPE_DIGEST => Ok(DataType::Digest),
            TYPE_SYNC_REQUEST => Ok(DataType::SyncRequest),
            TYPE_FILE => Ok(DataType::File),
            other => Err(ProtocolError::UnknownDataType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Digest-tree values
// ---------------------------------------------------------------------------

/// A directory-tree digest snapshot.
///
/// The digest model lives outside this crate. Here a `Dir` is carried as
/// an untyped JSON value so any digest representation passes through
/// unchanged. Convert to and from the concrete type with
/// [`Dir::encode`] and [`Dir::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dir(serde_json::Value);

impl Dir {
    /// Wraps an already-built JSON value.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Captures any serializable digest as a `Dir`.
    pub fn encode<T: Serialize>(digest: &T) -> Result<Self> {
        serde_json::to_value(digest)
            .map(Self)
            .map_err(ProtocolError::Encode)
    }

    /// Reads the snapshot back as a concrete digest type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.0).map_err(ProtocolError::Decode)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A single file entry of a digest tree. Opaque in the same way as [`Dir`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct File(serde_json::Value);

impl File {
    /// Wraps an already-built JSON value.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Captures any serializable file entry as a `File`.
    pub fn encode<T: Serialize>(entry: &T) -> Result<Self> {
        serde_json::to_value(entry)
            .map(Self)
            .map_err(ProtocolError::Encode)
    }

    /// Reads the entry back as a concrete file type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.0).map_err(ProtocolError::Decode)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Typed payloads
// ---------------------------------------------------------------------------

/// A payload type that lives inside `Request.Data` under a fixed tag.
///
/// The provided methods encode the payload as JSON bytes and decode it
/// back; implementors only name their tag.
pub trait TypedPayload: Serialize + DeserializeOwned {
    /// The `DataType` this payload travels under.
    const DATA_TYPE: DataType;

    /// Renders the payload as the bytes of `Request.Data`.
    fn to_data(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    /// Parses the bytes of `Request.Data`.
    fn from_data(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

/// Handshake identity announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityRequest {
    pub username: String,
}

impl TypedPayload for IdentityRequest {
    const DATA_TYPE: DataType = DataType::Identity;
}

/// A directory digest sent for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DigestRequest {
    pub dir: Dir,
}

impl TypedPayload for DigestRequest {
    const DATA_TYPE: DataType = DataType::Digest;
}

/// What to do with the file named by a [`SyncRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create => f.write_str("CREATE"),
            SyncAction::Update => f.write_str("UPDATE"),
            SyncAction::Delete => f.write_str("DELETE"),
        }
    }
}

/// A file-level create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncRequest {
    pub action: SyncAction,
    pub file: File,
}

impl TypedPayload for SyncRequest {
    const DATA_TYPE: DataType = DataType::SyncRequest;
}

/// File content transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileRequest {
    pub file: File,
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
}

impl TypedPayload for FileRequest {
    const DATA_TYPE: DataType = DataType::File;
}

/// Any payload a [`Request`] can carry, one variant per [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Identity(IdentityRequest),
    Digest(DigestRequest),
    Sync(SyncRequest),
    File(FileRequest),
}

impl Payload {
    /// The tag this payload travels under.
    pub fn data_type(&self) -> DataType {
        match self {
            Payload::Identity(_) => IdentityRequest::DATA_TYPE,
            Payload::Digest(_) => DigestRequest::DATA_TYPE,
            Payload::Sync(_) => SyncRequest::DATA_TYPE,
            Payload::File(_) => FileRequest::DATA_TYPE,
        }
    }

    /// Renders the payload as the bytes of `Request.Data`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Identity(p) => p.to_data(),
            Payload::Digest(p) => p.to_data(),
            Payload::Sync(p) => p.to_data(),
            Payload::File(p) => p.to_data(),
        }
    }

    /// Decodes `data` as the payload variant named by `data_type`.
    pub fn decode(data_type: DataType, data: &[u8]) -> Result<Self> {
        Ok(match data_type {
            DataType::Identity => Payload::Identity(IdentityRequest::from_data(data)?),
            DataType::Digest => Payload::Digest(DigestRequest::from_data(data)?),
            DataType::SyncRequest => Payload::Sync(SyncRequest::from_data(data)?),
            DataType::File => Payload::File(FileRequest::from_data(data)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Client → server envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    /// Who is asking.
    pub username: String,

    /// Tag selecting the schema of `data`. Kept as the raw string so an
    /// unknown tag still round-trips; see [`Request::data_type`].
    pub data_type: String,

    /// Opaque payload, conventionally a [`TypedPayload`] rendered as JSON.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Request {
    pub fn new(username: impl Into<String>, data_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            username: username.into(),
            data_type: data_type.into(),
            data,
        }
    }

    /// Builds a request whose tag and data agree with `payload`.
    pub fn with_payload(username: impl Into<String>, payload: &Payload) -> Result<Self> {
        Ok(Self::new(
            username,
            payload.data_type().as_str(),
            payload.encode()?,
        ))
    }

    /// Parses the `DataType` tag.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownDataType`] for tags outside the
    /// protocol vocabulary.
    pub fn data_type(&self) -> Result<DataType> {
        self.data_type.parse()
    }

    /// Dispatches on the tag and decodes `data` as the matching payload.
    pub fn payload(&self) -> Result<Payload> {
        Payload::decode(self.data_type()?, &self.data)
    }

    /// Renders the request as JSON text.
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parses a request from JSON text.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedEnvelope`] if the text is not a
    /// request object.
    pub fn from_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::MalformedEnvelope)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Username: {}", self.username)?;
        writeln!(f, "DataType: {}", self.data_type)?;
        writeln!(f, "Data: {}", String::from_utf8_lossy(&self.data))
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Server → client envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    /// HTTP-style status, normally [`STATUS_OK`] or [`STATUS_BAD`]. Any
    /// integer a peer sends is accepted.
    pub status: i64,

    pub message: String,

    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Response {
    pub fn new(status: i64, message: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// A `200` response with the given message and data.
    pub fn ok(message: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(STATUS_OK, message, data)
    }

    /// A `400` response carrying a reason and no data.
    pub fn bad(message: impl Into<String>) -> Self {
        Self::new(STATUS_BAD, message, Vec::new())
    }

    /// `200 ACCEPT` with the given data.
    pub fn accept(data: Vec<u8>) -> Self {
        Self::ok(MESSAGE_ACCEPT, data)
    }

    /// `400 DENY` with no data.
    pub fn deny() -> Self {
        Self::bad(MESSAGE_DENY)
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// True for exactly `200 ACCEPT`.
    pub fn is_accept(&self) -> bool {
        self.is_ok() && self.message == MESSAGE_ACCEPT
    }

    /// Renders the response as JSON text.
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parses a response from JSON text.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedEnvelope`] if the text is not a
    /// response object.
    pub fn from_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ProtocolError::MalformedEnvelope)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Message: {}", self.message)?;
        writeln!(f, "Data: {}", String::from_utf8_lossy(&self.data))
    }
}

// =========================================================================
// Tests
// =========================================================================
