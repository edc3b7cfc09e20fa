//! HTTP/1.x protocol implementation.
//!
//! Serves static files over HTTP/1.0 and HTTP/1.1 with keep-alive.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection request/response state machine
//! - **`parser`**: request-line tokenizer and `Connection` header scan
//! - **`request`**: methods, versions, and the parsed request
//! - **`response`**: status codes and the status-deciding response builder
//! - **`writer`**: head serialization and partial-write-safe sending
//! - **`path`**: URI to filesystem path mapping
//! - **`mime`**: content type from file extension
//! - **`file`**: file metadata lookup
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Waiting   │ ← read until the header block is buffered (idle timeout)
//!        └──────┬──────┘
//!               │ blank line seen, buffer full, or timeout after a request line
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← parse, build response, consume bytes
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │  WritingHeader   │ ← status line + headers
//!        └──────┬───────────┘
//!               │ 200 to GET
//!               ▼
//!        ┌──────────────────┐
//!        │   WritingBody    │ ← file in CHUNK_SIZE pieces
//!        └──────┬───────────┘
//!               ├─ Keep-Alive, cycles left → Waiting
//!               └─ otherwise → Closed
//! ```

pub mod connection;
pub mod file;
pub mod mime;
pub mod parser;
pub mod path;
pub mod request;
pub mod response;
pub mod writer;
