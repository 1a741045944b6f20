//! Script generation pipeline boundary.
//!
//! The network calls (Whisper transcription, chat completion, YouTube
//! oEmbed and transcripts) are made by the JavaScript host. This crate
//! validates what goes in and what comes out:
//!
//! - `audio` checks the upload descriptor before transcription.
//! - `youtube` recognises reference URLs.
//! - `prompt` builds the request bodies.
//! - `script` parses and validates the completion.

pub mod audio;
pub mod prompt;
pub mod script;
pub mod youtube;
