//! # openapi-patch
//!
//! Post-processing for a generated OpenAPI document before a documentation
//! site renders it into an API reference.
//!
//! The upstream generator emits `"ref":"<name>"` pointer fields that the
//! renderer cannot handle. This crate strips them in place and can derive the
//! reference sidebar (categories per tag, one entry per operation) from the
//! cleaned document.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ generator  │──▶│ openapi.json │──▶│  sanitize    │ (in place)
//! └────────────┘   └──────────────┘   └──────┬───────┘
//!                                            │
//!                       ┌────────────────────┤
//!                       ▼                    ▼
//!                ┌─────────────┐     ┌──────────────┐
//!                │  renderer   │     │   sidebar    │
//!                └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! patch-openapi                                  # strip "ref" from docs/specs/openapi.json
//! patch-openapi patch --spec build/openapi.json --mode structural
//! patch-openapi patch --check                    # fail if any "ref" field remains
//! patch-openapi sidebar --output docs/api/sidebar.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`sanitize`] | Textual and structural field removal |
//! | [`patch`] | In-place file patching |
//! | [`sidebar`] | Sidebar derived from the document |

pub mod config;
pub mod patch;
pub mod sanitize;
pub mod sidebar;
