// Adapters layer: concrete implementations for external systems (http, sqlite, clipboard, audio, terminal).

pub mod clipboard;
pub mod http;
pub mod pty;
pub mod sound;
pub mod sqlite;
pub mod tui;
