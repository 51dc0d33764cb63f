// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External media services used by chat commands.
//!
//! Logo rendering, music search/resolution, and file hosting uploads are
//! all thin HTTP clients; validation happens locally before any network
//! call so user mistakes fail fast.

pub mod hosting;
pub mod logo;
pub mod music;

pub use hosting::{HostingClient, HostingService, MAX_UPLOAD_BYTES};
pub use logo::{
    invalid_style_message, logo_categories, logo_style_count, logo_style_segment, logo_styles,
    LogoClient, MAX_LOGO_TEXT,
};
pub use music::{MusicClient, Track};
